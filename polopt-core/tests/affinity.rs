use polopt_core::affinity::{assigned_cpu, check_cpu, total_cpus};

#[test]
fn default_assignment_wraps_on_cpu_count() {
    let cpus = total_cpus();
    for rank in 0..8 {
        assert_eq!(assigned_cpu(rank, None), rank % cpus);
    }
}

#[test]
fn explicit_table_wraps_on_table_length() {
    let table = [4usize, 9];
    assert_eq!(assigned_cpu(0, Some(&table)), 4);
    assert_eq!(assigned_cpu(1, Some(&table)), 9);
    // rank 3 mod 2 = entry 1
    assert_eq!(assigned_cpu(3, Some(&table)), 9);
}

#[test]
fn empty_table_falls_back_to_cpu_count() {
    let cpus = total_cpus();
    assert_eq!(assigned_cpu(5, Some(&[])), 5 % cpus);
}

#[test]
fn check_cpu_rejects_indices_the_machine_lacks() {
    assert!(check_cpu(0).is_ok());
    assert!(check_cpu(100_000).is_err());
}
