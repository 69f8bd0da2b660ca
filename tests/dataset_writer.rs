use kira_powersim::design::DatasetAssembler;
use kira_powersim::io::tsv_writer::write_dataset;
use kira_powersim::sampler::OutcomeSupport;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn long_format_rows() {
    let groups = vec!["control".to_string(), "treatment".to_string()];
    let support = OutcomeSupport::from_bounds(1, 100).unwrap();
    let assembler =
        DatasetAssembler::new(&groups, 2, &[50.0, 50.0, 50.0, 45.0], &[10.0; 4], &support)
            .unwrap();
    let data = assembler
        .assemble(3, &mut ChaCha8Rng::seed_from_u64(4))
        .unwrap();

    let mut buf = Vec::new();
    write_dataset(&mut buf, &data).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "subject_id\tgroup\ttime\tvalue");
    assert_eq!(lines.len(), 1 + 12);

    let first: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(first[1], "control");
    assert_eq!(first[2], "1");
    let value: i32 = first[3].parse().unwrap();
    assert!((1..=100).contains(&value));

    let last: Vec<&str> = lines[12].split('\t').collect();
    assert_eq!(last[1], "treatment");
    assert_eq!(last[2], "2");
}
