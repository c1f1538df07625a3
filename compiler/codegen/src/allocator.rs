use lir::Register;

/// Free flags for the general purpose pool. Scratch registers are never handed out.
#[derive(Debug, Clone)]
pub struct RegisterAllocator {
    free: Vec<bool>,
}

impl RegisterAllocator {
    pub const MIN_REGISTERS: usize = 2;
    pub const MAX_REGISTERS: usize = Register::POOL.len();

    /// `count` is clamped to the size of the pool
    pub fn new(count: usize) -> Self {
        let count = count.clamp(Self::MIN_REGISTERS, Self::MAX_REGISTERS);

        Self {
            free: vec![true; count],
        }
    }

    /// Lowest numbered free register, `None` once the pool is exhausted
    pub fn acquire(&mut self) -> Option<Register> {
        let index = self.free.iter().position(|free| *free)?;
        self.free[index] = false;

        let register = Register::POOL[index];
        log::debug!("acquired register {}", register);
        Some(register)
    }

    pub fn release(&mut self, register: Register) {
        match self.index_of(register) {
            Some(index) if !self.free[index] => {
                self.free[index] = true;
                log::debug!("released register {}", register);
            }
            Some(_) => log::warn!("register {} released twice", register),
            None => log::warn!("register {} is not managed by the allocator", register),
        }
    }

    pub fn capacity(&self) -> usize {
        self.free.len()
    }

    pub fn available(&self) -> usize {
        self.free.iter().filter(|free| **free).count()
    }

    fn index_of(&self, register: Register) -> Option<usize> {
        Register::POOL[..self.capacity()]
            .iter()
            .position(|r| *r == register)
    }
}

impl Default for RegisterAllocator {
    fn default() -> Self {
        Self::new(Self::MAX_REGISTERS)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn hands_out_lowest_first() {
        let mut allocator = RegisterAllocator::default();

        assert_eq!(allocator.acquire(), Some(Register::R0));
        assert_eq!(allocator.acquire(), Some(Register::R1));
        assert_eq!(allocator.acquire(), Some(Register::R2));
        assert_eq!(allocator.acquire(), Some(Register::R3));
        assert_eq!(allocator.acquire(), None);
    }

    #[test]
    fn released_register_is_reused() {
        let mut allocator = RegisterAllocator::new(3);
        let r0 = allocator.acquire();
        let r1 = allocator.acquire();

        assert_eq!((r0, r1), (Some(Register::R0), Some(Register::R1)));

        allocator.release(Register::R0);
        assert_eq!(allocator.available(), 2);
        assert_eq!(allocator.acquire(), Some(Register::R0));
        assert_eq!(allocator.acquire(), Some(Register::R2));
        assert_eq!(allocator.acquire(), None);
    }

    #[test]
    fn pool_size_is_clamped() {
        assert_eq!(RegisterAllocator::new(0).capacity(), 2);
        assert_eq!(RegisterAllocator::new(9).capacity(), 4);

        let mut small = RegisterAllocator::new(2);
        small.acquire();
        small.acquire();
        assert_eq!(small.acquire(), None);
    }

    #[test]
    fn foreign_and_double_release_are_ignored() {
        let mut allocator = RegisterAllocator::new(2);

        allocator.release(Register::SCRATCH_A);
        allocator.release(Register::R3);
        allocator.release(Register::R0);
        assert_eq!(allocator.available(), 2);

        allocator.acquire();
        allocator.release(Register::R0);
        allocator.release(Register::R0);
        assert_eq!(allocator.available(), 2);
    }
}
