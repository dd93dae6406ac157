use rand::seq::IndexedRandom;

pub const SWEAR_DESCRIPTIONS: &[&str] = &[
    "Potty mouth strikes again!",
    "That one's going in the jar.",
    "Language! Pay up.",
    "Another coin for the jar.",
    "Someone call the swear police.",
    "Your mum would be disappointed.",
    "Wash your mouth out with soap.",
    "Cha-ching! Thanks for the donation.",
    "Keep it clean, champ.",
    "The jar grows heavier.",
];

/// Picks the description logged with a new swear
pub fn random_description() -> &'static str {
    SWEAR_DESCRIPTIONS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("Swear added")
}
