use anyhow::{Result, ensure};

/// Maps a worker rank to a CPU index. An explicit assignment table wraps
/// around on rank; without one, ranks spread round-robin over all CPUs.
pub fn assigned_cpu(rank: usize, cpu_assignments: Option<&[usize]>) -> usize {
    match cpu_assignments {
        Some(table) if !table.is_empty() => table[rank % table.len()],
        _ => rank % total_cpus(),
    }
}

/// Rejects a CPU index the machine does not have. Called once per rank
/// before the worker pool spawns, so a bad assignment table fails the run
/// up front instead of stranding the surviving workers at a barrier.
pub fn check_cpu(cpu: usize) -> Result<()> {
    let cpus = total_cpus();
    ensure!(cpu < cpus, "cpu assignment {cpu} out of range, machine has {cpus} cpus");
    Ok(())
}

pub fn total_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Pins the calling thread to a single CPU. A CPU index the kernel rejects
/// is a configuration bug, so the error goes straight back to the caller
/// instead of being retried.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> Result<()> {
    use std::mem;

    unsafe {
        let mut set: libc::cpu_set_t = mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu, &mut set);
        let ret = libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), &set);
        if ret != 0 {
            anyhow::bail!(
                "sched_setaffinity to cpu {cpu} failed: {}",
                std::io::Error::last_os_error()
            );
        }
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(_cpu: usize) -> Result<()> {
    Ok(())
}
