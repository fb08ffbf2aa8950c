// Storage access accounting, used to compare withdrawal strategies

/// Weight of one persistent read
pub const READ_COST: u64 = 2_100;

/// Weight of one persistent write
pub const WRITE_COST: u64 = 5_000;

/// Counts persistent reads and writes performed by a transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostMeter {
    pub reads: u64,
    pub writes: u64,
}

impl CostMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&mut self) {
        self.reads += 1;
    }

    pub fn write(&mut self) {
        self.writes += 1;
    }

    /// Weighted total
    pub fn cost(&self) -> u64 {
        self.reads * READ_COST + self.writes * WRITE_COST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost() {
        let mut meter = CostMeter::new();
        assert_eq!(meter.cost(), 0);

        meter.read();
        meter.read();
        meter.write();

        assert_eq!(meter.reads, 2);
        assert_eq!(meter.writes, 1);
        assert_eq!(meter.cost(), 2 * READ_COST + WRITE_COST);
    }
}
