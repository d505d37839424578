//! Stock tag behaviors for the standard catalog.
//!
//! Each tag is a unit struct implementing [`super::TagBehavior`]. Tags never
//! call each other; they communicate only through the usage channels on the
//! action instance.
mod ammunition;
mod damage_type;
mod flanking;
mod melee;
mod ranged;
mod reaction;
mod spell;
mod strike;

pub use ammunition::AmmunitionTag;
pub use damage_type::DamageTypeTag;
pub use flanking::FlankingTag;
pub use melee::MeleeTag;
pub use ranged::RangedTag;
pub use reaction::{REACTION_USED, ReactionTag};
pub use spell::SpellTag;
pub use strike::StrikeTag;
