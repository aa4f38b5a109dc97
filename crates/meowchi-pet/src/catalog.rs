//! Fixed catalogs: evolution forms and collectible hats.
//!
//! Both catalogs are compiled in. Declaration order is significant: the
//! evolution engine resolves simultaneously-qualifying siblings by taking the
//! first one declared, and hat cycling walks items in this order.
//!
//! - [`FORMS`] -- the evolution tree (base, three tier-1 forms, three tier-2 forms)
//! - [`ITEMS`] -- the hat collection

use meowchi_types::{BASE_FORM_ID, Counter, FormPath, FormView, Rarity};

/// Milliseconds in one minute.
const MINUTE_MS: u64 = 60_000;

/// Milliseconds in one hour.
const HOUR_MS: u64 = 60 * MINUTE_MS;

// ---------------------------------------------------------------------------
// Evolution forms
// ---------------------------------------------------------------------------

/// A single condition that must hold before a form can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The pet must currently be in this form.
    PreviousForm(&'static str),
    /// Rounded average care over the trailing hour must be at least this.
    AverageCare(u64),
    /// Total playtime must be at least this many milliseconds.
    Playtime {
        /// Threshold in milliseconds.
        millis: u64,
    },
    /// Care interactions must be at least this many.
    Interactions(u64),
    /// Detected neglect periods must be at least this many.
    NeglectPeriods(u64),
    /// Time since the last interaction must be at least this many milliseconds.
    IdleTime {
        /// Threshold in milliseconds.
        millis: u64,
    },
    /// Chaos actions must be at least this many.
    ChaosActions(u64),
    /// Perfect-care day classifications must be at least this many.
    PerfectCareDays(u64),
    /// Balanced day classifications must be at least this many.
    BalancedDays(u64),
}

impl Requirement {
    /// Stable snake-case name used in progress reports.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PreviousForm(_) => "previous_form",
            Self::AverageCare(_) => "avg_care",
            Self::Playtime { .. } => "playtime",
            Self::Interactions(_) => "interactions",
            Self::NeglectPeriods(_) => "neglect_periods",
            Self::IdleTime { .. } => "idle_time",
            Self::ChaosActions(_) => "chaos_actions",
            Self::PerfectCareDays(_) => "perfect_care_days",
            Self::BalancedDays(_) => "balanced_days",
        }
    }
}

/// An immutable node of the evolution tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolutionForm {
    /// Stable identifier, persisted in saves.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Emoji rendered for the form.
    pub emoji: &'static str,
    /// Depth in the tree (0 = base).
    pub tier: u8,
    /// Branch classification.
    pub path: FormPath,
    /// Every condition that must hold to evolve into this form.
    pub requirements: &'static [Requirement],
    /// Flavor text.
    pub description: &'static str,
}

impl EvolutionForm {
    /// The form this one must be reached from, if any.
    pub fn predecessor(&self) -> Option<&'static str> {
        self.requirements.iter().find_map(|req| match req {
            Requirement::PreviousForm(id) => Some(*id),
            _ => None,
        })
    }

    /// Owned view for the presentation layer.
    pub fn view(&self) -> FormView {
        FormView {
            id: self.id.to_owned(),
            name: self.name.to_owned(),
            emoji: self.emoji.to_owned(),
            tier: self.tier,
            path: self.path,
            description: self.description.to_owned(),
        }
    }
}

const BASE_FORM: EvolutionForm = EvolutionForm {
    id: BASE_FORM_ID,
    name: "Meowchi",
    emoji: "🐱",
    tier: 0,
    path: FormPath::None,
    requirements: &[],
    description: "Your adorable digital companion",
};

/// The evolution tree, in declaration order.
pub static FORMS: [EvolutionForm; 7] = [
    BASE_FORM,
    // --- Tier 1 ---
    EvolutionForm {
        id: "angel",
        name: "Meowchi Angel",
        emoji: "😇",
        tier: 1,
        path: FormPath::Good,
        requirements: &[
            Requirement::PreviousForm(BASE_FORM_ID),
            Requirement::AverageCare(80),
            Requirement::Playtime { millis: HOUR_MS },
            Requirement::Interactions(100),
        ],
        description: "A blessed kitty with a halo",
    },
    EvolutionForm {
        id: "sleepy",
        name: "Sleepy Meowchi",
        emoji: "😴",
        tier: 1,
        path: FormPath::Neutral,
        requirements: &[
            Requirement::PreviousForm(BASE_FORM_ID),
            Requirement::AverageCare(40),
            Requirement::Playtime { millis: 2 * HOUR_MS },
            Requirement::IdleTime { millis: 30 * MINUTE_MS },
        ],
        description: "A lazy but content feline",
    },
    EvolutionForm {
        id: "goblin",
        name: "Meowchi Goblin",
        emoji: "👺",
        tier: 1,
        path: FormPath::Bad,
        requirements: &[
            Requirement::PreviousForm(BASE_FORM_ID),
            Requirement::AverageCare(20),
            Requirement::NeglectPeriods(3),
            Requirement::Playtime { millis: HOUR_MS },
        ],
        description: "A mischievous troublemaker",
    },
    // --- Tier 2 ---
    EvolutionForm {
        id: "celestial",
        name: "Celestial Meowchi",
        emoji: "✨",
        tier: 2,
        path: FormPath::Good,
        requirements: &[
            Requirement::PreviousForm("angel"),
            Requirement::AverageCare(90),
            Requirement::Playtime { millis: 3 * HOUR_MS },
            Requirement::PerfectCareDays(2),
        ],
        description: "A divine being of pure light",
    },
    EvolutionForm {
        id: "overlord",
        name: "Overlord Meowchi",
        emoji: "👹",
        tier: 2,
        path: FormPath::Bad,
        requirements: &[
            Requirement::PreviousForm("goblin"),
            Requirement::AverageCare(10),
            Requirement::Playtime { millis: 3 * HOUR_MS },
            Requirement::ChaosActions(50),
        ],
        description: "The dark lord of all cats",
    },
    EvolutionForm {
        id: "zen",
        name: "Zen Master Meowchi",
        emoji: "🧘",
        tier: 2,
        path: FormPath::Neutral,
        requirements: &[
            Requirement::PreviousForm("sleepy"),
            Requirement::AverageCare(60),
            Requirement::Playtime { millis: 4 * HOUR_MS },
            Requirement::BalancedDays(3),
        ],
        description: "Achieved perfect balance",
    },
];

/// The tier-0 root of the tree.
pub fn base_form() -> &'static EvolutionForm {
    find_form(BASE_FORM_ID).unwrap_or(&BASE_FORM)
}

/// Look up a form by identifier.
pub fn find_form(id: &str) -> Option<&'static EvolutionForm> {
    FORMS.iter().find(|form| form.id == id)
}

// ---------------------------------------------------------------------------
// Collectible items
// ---------------------------------------------------------------------------

/// Counter threshold that unlocks an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockCriterion {
    /// Counter to watch.
    pub counter: Counter,
    /// Value at which the item unlocks.
    pub threshold: u64,
}

/// An immutable entry of the hat collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectibleItem {
    /// Stable identifier, persisted in saves.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Emoji rendered on the pet.
    pub emoji: &'static str,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Whether a fresh pet already owns the item.
    pub unlocked_by_default: bool,
    /// Counter threshold that unlocks the item, if any.
    pub criterion: Option<UnlockCriterion>,
    /// Flavor text.
    pub description: &'static str,
}

const fn criterion(counter: Counter, threshold: u64) -> Option<UnlockCriterion> {
    Some(UnlockCriterion { counter, threshold })
}

/// The hat collection, in declaration order.
pub static ITEMS: [CollectibleItem; 9] = [
    CollectibleItem {
        id: "none",
        name: "No Hat",
        emoji: "",
        rarity: Rarity::Common,
        unlocked_by_default: true,
        criterion: None,
        description: "Au naturel",
    },
    CollectibleItem {
        id: "party",
        name: "Party Hat",
        emoji: "🎉",
        rarity: Rarity::Common,
        unlocked_by_default: true,
        criterion: None,
        description: "Ready to celebrate!",
    },
    CollectibleItem {
        id: "crown",
        name: "Royal Crown",
        emoji: "👑",
        rarity: Rarity::Rare,
        unlocked_by_default: false,
        criterion: criterion(Counter::Inputs, 500),
        description: "Fit for a king!",
    },
    CollectibleItem {
        id: "wizard",
        name: "Wizard Hat",
        emoji: "🧙",
        rarity: Rarity::Rare,
        unlocked_by_default: false,
        criterion: criterion(Counter::Inputs, 1000),
        description: "Magical powers included",
    },
    CollectibleItem {
        id: "chef",
        name: "Chef Hat",
        emoji: "👨‍🍳",
        rarity: Rarity::Common,
        unlocked_by_default: false,
        criterion: criterion(Counter::Feeds, 20),
        description: "Master of the kitchen",
    },
    CollectibleItem {
        id: "santa",
        name: "Santa Hat",
        emoji: "🎅",
        rarity: Rarity::Epic,
        unlocked_by_default: false,
        criterion: criterion(Counter::Inputs, 2500),
        description: "Ho ho ho!",
    },
    CollectibleItem {
        id: "pirate",
        name: "Pirate Hat",
        emoji: "🏴‍☠️",
        rarity: Rarity::Rare,
        unlocked_by_default: false,
        criterion: criterion(Counter::Plays, 50),
        description: "Ahoy matey!",
    },
    CollectibleItem {
        id: "cowboy",
        name: "Cowboy Hat",
        emoji: "🤠",
        rarity: Rarity::Common,
        unlocked_by_default: false,
        criterion: criterion(Counter::Inputs, 250),
        description: "Yeehaw!",
    },
    CollectibleItem {
        id: "graduation",
        name: "Graduation Cap",
        emoji: "🎓",
        rarity: Rarity::Epic,
        unlocked_by_default: false,
        criterion: criterion(Counter::Inputs, 5000),
        description: "Smart kitty!",
    },
];

/// Look up an item by identifier.
pub fn find_item(id: &str) -> Option<&'static CollectibleItem> {
    ITEMS.iter().find(|item| item.id == id)
}
