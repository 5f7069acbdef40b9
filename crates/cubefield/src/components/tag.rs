use std::borrow::Cow;

/// A free-form label. The demo uses `"Player"`, `"Cube"`, `"Spawned"`,
/// `"Ground"` and `"Physics"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Tag(pub Cow<'static, str>);

impl Tag {
    pub const PLAYER: &'static str = "Player";
    pub const CUBE: &'static str = "Cube";
    pub const SPAWNED: &'static str = "Spawned";
    pub const GROUND: &'static str = "Ground";
    pub const PHYSICS: &'static str = "Physics";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}
