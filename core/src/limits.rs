/// Hard caps that keep a single scheduler step bounded

/// Maximum chain entries flushed in one step; the rest wait for the next step.
pub const MAX_CHAIN_FLUSH_PER_STEP: usize = 32;
/// Upper bound on follow-up attacks regardless of configuration.
pub const MAX_FOLLOW_UP_ATTACKS: u8 = 8;
/// Upper bound on minions a single caster may keep alive.
pub const MAX_MINIONS_PER_CASTER: u8 = 6;
/// Maximum hits a single lane strike may perform.
pub const MAX_STRIKE_HITS: u8 = 6;
/// Maximum stacks of a stackable status.
pub const MAX_STATUS_STACKS: u8 = 5;
