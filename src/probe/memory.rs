/// Memory probe
///
/// Acquires fixed-size blocks one at a time and keeps every one of them
/// until the process exits. A denied allocation ends the run with a reported
/// outcome instead of aborting the process.
use crate::config::types::{MemoryProbeConfig, ProbeError, ProbeExit, Result, FILL_BYTE};
use crate::utils::output::Reporter;
use std::io::Write;

/// One allocation unit. Contents are opaque.
#[derive(Debug)]
pub struct Block {
    bytes: Vec<u8>,
}

impl Block {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Source of allocation units
pub trait BlockAllocator {
    fn allocate(&mut self, size: usize) -> Result<Block>;
}

/// Allocates from the process heap through fallible reservation
#[derive(Debug, Default)]
pub struct SystemAllocator;

impl BlockAllocator for SystemAllocator {
    fn allocate(&mut self, size: usize) -> Result<Block> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(size)
            .map_err(|e| ProbeError::AllocationExhausted {
                requested: size,
                reason: e.to_string(),
            })?;
        // Capacity is already reserved; writing every byte makes the pages resident.
        bytes.resize(size, FILL_BYTE);
        Ok(Block { bytes })
    }
}

/// Append-only set of retained blocks. There is no way to remove a block.
#[derive(Debug, Default)]
pub struct RetainedBlocks {
    blocks: Vec<Block>,
}

impl RetainedBlocks {
    pub fn new() -> Self {
        RetainedBlocks { blocks: Vec::new() }
    }

    /// Take ownership of `block`. Growing the container is itself fallible.
    pub fn retain(&mut self, block: Block) -> Result<()> {
        self.blocks
            .try_reserve(1)
            .map_err(|e| ProbeError::AllocationExhausted {
                requested: std::mem::size_of::<Block>(),
                reason: e.to_string(),
            })?;
        self.blocks.push(block);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Bytes held across all retained blocks
    pub fn total_bytes(&self) -> usize {
        self.blocks.iter().map(Block::len).sum()
    }
}

/// How a memory probe run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryOutcome {
    /// Every requested unit is held
    Completed { units: u64, reports: u64 },
    /// The environment denied a unit; `units` were held at that point
    Exhausted { units: u64, reports: u64, reason: String },
}

impl MemoryOutcome {
    pub fn units(&self) -> u64 {
        match self {
            MemoryOutcome::Completed { units, .. } | MemoryOutcome::Exhausted { units, .. } => *units,
        }
    }

    /// Progress reports emitted before the run ended
    pub fn reports(&self) -> u64 {
        match self {
            MemoryOutcome::Completed { reports, .. } | MemoryOutcome::Exhausted { reports, .. } => *reports,
        }
    }

    pub fn exit(&self) -> ProbeExit {
        match self {
            MemoryOutcome::Completed { .. } => ProbeExit::Success,
            MemoryOutcome::Exhausted { .. } => ProbeExit::AllocationExhausted,
        }
    }
}

/// Memory probe. Owns every block it acquires for as long as it lives.
pub struct MemoryProbe<A: BlockAllocator> {
    config: MemoryProbeConfig,
    allocator: A,
    retained: RetainedBlocks,
}

impl MemoryProbe<SystemAllocator> {
    pub fn new(config: MemoryProbeConfig) -> Result<Self> {
        Self::with_allocator(config, SystemAllocator)
    }
}

impl<A: BlockAllocator> MemoryProbe<A> {
    pub fn with_allocator(config: MemoryProbeConfig, allocator: A) -> Result<Self> {
        config.validate()?;
        Ok(MemoryProbe {
            config,
            allocator,
            retained: RetainedBlocks::new(),
        })
    }

    pub fn retained(&self) -> &RetainedBlocks {
        &self.retained
    }

    /// Hand the retained blocks to the caller, who keeps them until exit
    pub fn into_retained(self) -> RetainedBlocks {
        self.retained
    }

    /// Acquire units until the target is reached or an allocation is denied.
    ///
    /// Exhaustion is an outcome, not an error; only report stream failures
    /// are returned as `Err`.
    pub fn run<W: Write>(&mut self, reporter: &mut Reporter<W>) -> Result<MemoryOutcome> {
        let target = self.config.target_mb;
        reporter.line(format_args!("Attempting to allocate {} MB of memory...", target))?;
        log::info!(
            "memory probe started: target={} units, unit_bytes={}",
            target,
            self.config.unit_bytes
        );

        let mut reports = 0;
        while (self.retained.len() as u64) < target {
            match self.acquire_one() {
                Ok(()) => {}
                Err(ProbeError::AllocationExhausted { requested, reason }) => {
                    let units = self.retained.len() as u64;
                    log::warn!(
                        "allocation of {} bytes denied after {} units: {}",
                        requested,
                        units,
                        reason
                    );
                    reporter.line(format_args!(
                        "Memory allocation failed after {} MB: {}",
                        units, reason
                    ))?;
                    return Ok(MemoryOutcome::Exhausted { units, reports, reason });
                }
                Err(e) => return Err(e),
            }

            let held = self.retained.len() as u64;
            if held % self.config.report_every == 0 {
                reporter.line(format_args!("Allocated {} MB", held))?;
                reports += 1;
            }
        }

        reporter.line(format_args!("Successfully allocated {} MB of memory", target))?;
        log::info!("memory probe completed: {} bytes retained", self.retained.total_bytes());
        Ok(MemoryOutcome::Completed { units: target, reports })
    }

    fn acquire_one(&mut self) -> Result<()> {
        let block = self.allocator.allocate(self.config.unit_bytes)?;
        self.retained.retain(block)
    }
}
