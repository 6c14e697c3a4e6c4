//! Real-time scheduling helpers (Linux SCHED_FIFO / affinity / mlockall).
//!
//! Everything here is best effort: a failure is logged and the measurement
//! proceeds with normal scheduling.

use tracing::warn;

#[cfg(target_os = "linux")]
pub fn setup_rt_once(prio: Option<i32>) {
    use std::sync::OnceLock;
    use tracing::info;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    // Lock current and future pages; fall back to current only when the
    // memlock limit is too small for both.
    fn lock_memory() -> eyre::Result<&'static str> {
        use nix::errno::Errno;
        use nix::sys::mman::{MlockAllFlags, mlockall};

        match mlockall(MlockAllFlags::MCL_CURRENT | MlockAllFlags::MCL_FUTURE) {
            Ok(()) => Ok("current|future"),
            Err(e) if e == Errno::EPERM || e == Errno::ENOMEM => {
                mlockall(MlockAllFlags::MCL_CURRENT).map_err(|e2| {
                    eyre::eyre!(
                        "mlockall(current|future) failed: {e}; fallback mlockall(current) also failed: {e2}; \
                         hint: needs CAP_IPC_LOCK (or root) and sufficient 'ulimit -l'"
                    )
                })?;
                Ok("current")
            }
            Err(e) => Err(eyre::eyre!("mlockall(current|future) failed: {e}")),
        }
    }

    // Apply SCHED_FIFO priority, clamped to the system range.
    fn apply_fifo_priority(prio: Option<i32>) -> eyre::Result<i32> {
        use libc::{
            SCHED_FIFO, sched_get_priority_max, sched_get_priority_min, sched_param,
            sched_setscheduler,
        };

        let (min, max) = unsafe {
            let min = sched_get_priority_min(SCHED_FIFO);
            let max = sched_get_priority_max(SCHED_FIFO);
            if min < 0 || max < 0 { (1, 99) } else { (min, max) }
        };
        let value = prio.unwrap_or(max).clamp(min, max);
        let param = sched_param {
            sched_priority: value,
        };
        let rc = unsafe { sched_setscheduler(0, SCHED_FIFO, &param) };
        if rc != 0 {
            return Err(eyre::eyre!(std::io::Error::last_os_error()));
        }
        Ok(value)
    }

    // Pin the process to `cpu` if the current affinity mask allows it.
    fn pin_to_cpu(cpu: usize) -> eyre::Result<()> {
        use nix::sched::{CpuSet, sched_getaffinity, sched_setaffinity};
        use nix::unistd::Pid;

        if cpu >= CpuSet::count() {
            eyre::bail!("CPU {cpu} exceeds cpu_set_t capacity {}", CpuSet::count());
        }
        let allowed = sched_getaffinity(Pid::from_raw(0))?;
        if !allowed.is_set(cpu)? {
            eyre::bail!("CPU {cpu} not permitted by current affinity mask");
        }
        let mut desired = CpuSet::new();
        desired.set(cpu)?;
        sched_setaffinity(Pid::from_raw(0), &desired)?;
        Ok(())
    }

    RT_ONCE.get_or_init(|| {
        match lock_memory() {
            Ok(mode) => info!(mode, "RT: memory locked"),
            Err(err) => warn!(error = %err, "RT: memory lock not applied"),
        }
        match apply_fifo_priority(prio) {
            Ok(p) => info!(priority = p, "RT: SCHED_FIFO applied"),
            Err(err) => warn!(requested = ?prio, error = %err, "RT: SCHED_FIFO not applied"),
        }
        match pin_to_cpu(0) {
            Ok(()) => info!(cpu = 0, "RT: affinity applied"),
            Err(err) => warn!(error = %err, "RT: affinity not applied"),
        }
    });
}

#[cfg(not(target_os = "linux"))]
pub fn setup_rt_once(prio: Option<i32>) {
    warn!(requested = ?prio, "RT: real-time mode is only supported on Linux; continuing without it");
}
