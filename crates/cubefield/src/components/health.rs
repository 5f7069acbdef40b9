/// Hit points. An entity whose health reaches zero is destroyed by the
/// `HealthSystem` at the end of its frame step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Subtract `amount`, never going below zero.
    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    /// Add `amount`, never going above `max`.
    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Remaining fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_and_heal_clamp() {
        let mut hp = Health::new(50.0);
        hp.take_damage(20.0);
        assert_eq!(hp.current, 30.0);
        hp.heal(100.0);
        assert_eq!(hp.current, 50.0);
        hp.take_damage(80.0);
        assert_eq!(hp.current, 0.0);
        assert!(hp.is_dead());
    }

    #[test]
    fn fraction() {
        let mut hp = Health::new(200.0);
        hp.take_damage(50.0);
        assert_eq!(hp.fraction(), 0.75);
        assert_eq!(Health::new(0.0).fraction(), 0.0);
    }
}
