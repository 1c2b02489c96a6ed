//! Resource usage evidence from the kernel

use nix::sys::resource::{getrusage, UsageWho};

/// Peak resident set size of this process in KiB, if the kernel reports it
pub fn peak_rss_kib() -> Option<u64> {
    match getrusage(UsageWho::RUSAGE_SELF) {
        // Linux reports ru_maxrss in kilobytes
        Ok(usage) => u64::try_from(usage.max_rss()).ok(),
        Err(e) => {
            log::debug!("getrusage failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_rss_covers_resident_allocation() {
        let block = vec![b'X'; 32 * 1024 * 1024];
        assert!(block.iter().all(|&b| b == b'X'));

        let peak = peak_rss_kib().expect("getrusage reports max RSS on Linux");
        assert!(peak >= 16 * 1024, "peak RSS {} KiB below touched allocation", peak);
    }
}
