//! Exercise catalog - static templates for every built-in movement

use serde::{Deserialize, Serialize};

/// Load category. Only `Upper` exercises take part in weight progression.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Upper,
    Lower,
    None,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Upper => "upper",
            Category::Lower => "lower",
            Category::None => "-",
        }
    }
}

/// What a single set of the exercise asks for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExerciseKind {
    Strength { reps: u32 },
    TimedHold { hold_secs: u32 },
    Stretch { hold_secs: u32 },
}

impl ExerciseKind {
    /// Rep target per set; 0 for anything held on time
    pub fn target_reps(&self) -> u32 {
        match self {
            ExerciseKind::Strength { reps } => *reps,
            ExerciseKind::TimedHold { .. } | ExerciseKind::Stretch { .. } => 0,
        }
    }

    /// Replace the per-set target (reps, or seconds for timed kinds)
    pub fn with_target(self, value: u32) -> Self {
        match self {
            ExerciseKind::Strength { .. } => ExerciseKind::Strength { reps: value },
            ExerciseKind::TimedHold { .. } => ExerciseKind::TimedHold { hold_secs: value },
            ExerciseKind::Stretch { .. } => ExerciseKind::Stretch { hold_secs: value },
        }
    }

    pub fn is_strength(&self) -> bool {
        matches!(self, ExerciseKind::Strength { .. })
    }

    /// "3x8" or "1x30s"
    pub fn describe(&self, sets: u32) -> String {
        match self {
            ExerciseKind::Strength { reps } => format!("{}x{}", sets, reps),
            ExerciseKind::TimedHold { hold_secs } | ExerciseKind::Stretch { hold_secs } => {
                format!("{}x{}s", sets, hold_secs)
            }
        }
    }
}

/// Identifier of a built-in exercise. Order matches `CATALOG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExerciseId {
    PushUp,
    DumbbellBenchPress,
    DumbbellShoulderPress,
    OverheadTricepExtension,
    LateralRaise,
    DumbbellRow,
    BandPullApart,
    DumbbellCurl,
    GobletSquat,
    GluteBridge,
    StepUp,
    WallSit,
    BarHang,
    AssistedChinUp,
    BodyweightSquat,
    WallPushUp,
    HamstringStretch,
    HipFlexorStretch,
    ChestDoorwayStretch,
    ChildsPoseStretch,
}

impl ExerciseId {
    pub fn template(self) -> &'static ExerciseTemplate {
        &CATALOG[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.template().name
    }

    /// Look up a built-in exercise by its display name
    pub fn from_name(name: &str) -> Option<Self> {
        CATALOG.iter().find(|t| t.name == name).map(|t| t.id)
    }
}

#[derive(Debug, Clone)]
pub struct ExerciseTemplate {
    pub id: ExerciseId,
    pub name: &'static str,
    pub sets: u32,
    pub kind: ExerciseKind,
    pub category: Category,
    pub is_light: bool,
    /// Working weight used when no load record exists yet
    pub starting_weight: f64,
    pub instructions: &'static str,
}

/// Weight given to user-defined strength exercises with no history
pub const CUSTOM_STARTING_WEIGHT: f64 = 5.0;

pub const CATALOG: &[ExerciseTemplate] = &[
    ExerciseTemplate {
        id: ExerciseId::PushUp,
        name: "Push-Up",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 10 },
        category: Category::None,
        is_light: false,
        starting_weight: 0.0,
        instructions: "Hands under shoulders, body in one line. Lower until the chest nearly touches the floor",
    },
    ExerciseTemplate {
        id: ExerciseId::DumbbellBenchPress,
        name: "Dumbbell Bench Press",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 8 },
        category: Category::Upper,
        is_light: false,
        starting_weight: 15.0,
        instructions: "Lie on the bench, press both dumbbells up until the elbows are straight",
    },
    ExerciseTemplate {
        id: ExerciseId::DumbbellShoulderPress,
        name: "Dumbbell Shoulder Press",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 8 },
        category: Category::Upper,
        is_light: false,
        starting_weight: 10.0,
        instructions: "Seated, press the dumbbells overhead without arching the lower back",
    },
    ExerciseTemplate {
        id: ExerciseId::OverheadTricepExtension,
        name: "Overhead Tricep Extension",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 10 },
        category: Category::Upper,
        is_light: true,
        starting_weight: 10.0,
        instructions: "One dumbbell in both hands behind the head, extend the elbows toward the ceiling",
    },
    ExerciseTemplate {
        id: ExerciseId::LateralRaise,
        name: "Lateral Raise",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 12 },
        category: Category::Upper,
        is_light: true,
        starting_weight: 5.0,
        instructions: "Raise the dumbbells out to the sides up to shoulder height",
    },
    ExerciseTemplate {
        id: ExerciseId::DumbbellRow,
        name: "Dumbbell Row",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 10 },
        category: Category::Upper,
        is_light: false,
        starting_weight: 15.0,
        instructions: "One knee on the bench, pull the dumbbell to the hip, squeeze the shoulder blade",
    },
    ExerciseTemplate {
        id: ExerciseId::BandPullApart,
        name: "Band Pull-Apart",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 15 },
        category: Category::None,
        is_light: true,
        starting_weight: 0.0,
        instructions: "Arms straight in front, pull the band apart until it touches the chest",
    },
    ExerciseTemplate {
        id: ExerciseId::DumbbellCurl,
        name: "Dumbbell Curl",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 10 },
        category: Category::Upper,
        is_light: true,
        starting_weight: 10.0,
        instructions: "Elbows pinned to the sides, curl without swinging",
    },
    ExerciseTemplate {
        id: ExerciseId::GobletSquat,
        name: "Goblet Squat",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 10 },
        category: Category::Lower,
        is_light: false,
        starting_weight: 15.0,
        instructions: "Hold a dumbbell at the chest, sit between the heels, keep the chest up",
    },
    ExerciseTemplate {
        id: ExerciseId::GluteBridge,
        name: "Glute Bridge",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 12 },
        category: Category::Lower,
        is_light: false,
        starting_weight: 0.0,
        instructions: "On the back, feet flat, drive the hips up and pause at the top",
    },
    ExerciseTemplate {
        id: ExerciseId::StepUp,
        name: "Step-Up",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 8 },
        category: Category::Lower,
        is_light: false,
        starting_weight: 0.0,
        instructions: "Step onto a sturdy box with the whole foot, stand tall, step down slowly",
    },
    ExerciseTemplate {
        id: ExerciseId::WallSit,
        name: "Wall Sit",
        sets: 3,
        kind: ExerciseKind::TimedHold { hold_secs: 30 },
        category: Category::Lower,
        is_light: false,
        starting_weight: 0.0,
        instructions: "Back against the wall, knees at ninety degrees",
    },
    ExerciseTemplate {
        id: ExerciseId::BarHang,
        name: "Bar Hang",
        sets: 3,
        kind: ExerciseKind::TimedHold { hold_secs: 20 },
        category: Category::None,
        is_light: false,
        starting_weight: 0.0,
        instructions: "Dead hang from the bar, shoulders engaged, breathe",
    },
    ExerciseTemplate {
        id: ExerciseId::AssistedChinUp,
        name: "Assisted Chin-Up",
        sets: 3,
        kind: ExerciseKind::Strength { reps: 5 },
        category: Category::None,
        is_light: false,
        starting_weight: 0.0,
        instructions: "Underhand grip, feet on a band or chair, pull the chin over the bar",
    },
    ExerciseTemplate {
        id: ExerciseId::BodyweightSquat,
        name: "Bodyweight Squat",
        sets: 2,
        kind: ExerciseKind::Strength { reps: 10 },
        category: Category::None,
        is_light: true,
        starting_weight: 0.0,
        instructions: "Feet shoulder width, sit back and stand up, arms forward for balance",
    },
    ExerciseTemplate {
        id: ExerciseId::WallPushUp,
        name: "Wall Push-Up",
        sets: 2,
        kind: ExerciseKind::Strength { reps: 10 },
        category: Category::None,
        is_light: true,
        starting_weight: 0.0,
        instructions: "Hands on the wall at chest height, lower the chest to the wall and push back",
    },
    ExerciseTemplate {
        id: ExerciseId::HamstringStretch,
        name: "Hamstring Stretch",
        sets: 1,
        kind: ExerciseKind::Stretch { hold_secs: 30 },
        category: Category::None,
        is_light: true,
        starting_weight: 0.0,
        instructions: "Heel on a low step, hinge forward with a flat back",
    },
    ExerciseTemplate {
        id: ExerciseId::HipFlexorStretch,
        name: "Hip Flexor Stretch",
        sets: 1,
        kind: ExerciseKind::Stretch { hold_secs: 30 },
        category: Category::None,
        is_light: true,
        starting_weight: 0.0,
        instructions: "Half kneeling, tuck the pelvis and shift forward",
    },
    ExerciseTemplate {
        id: ExerciseId::ChestDoorwayStretch,
        name: "Chest Doorway Stretch",
        sets: 1,
        kind: ExerciseKind::Stretch { hold_secs: 30 },
        category: Category::None,
        is_light: true,
        starting_weight: 0.0,
        instructions: "Forearms on the door frame, step through until the chest opens",
    },
    ExerciseTemplate {
        id: ExerciseId::ChildsPoseStretch,
        name: "Child's Pose Stretch",
        sets: 1,
        kind: ExerciseKind::Stretch { hold_secs: 45 },
        category: Category::None,
        is_light: true,
        starting_weight: 0.0,
        instructions: "Knees wide, sit back onto the heels, arms long in front",
    },
];

/// Fully resolved exercise definition, built-in or user-defined
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSpec {
    /// `None` for custom exercises
    pub id: Option<ExerciseId>,
    pub name: String,
    pub sets: u32,
    pub kind: ExerciseKind,
    pub category: Category,
    pub is_light: bool,
    pub starting_weight: f64,
    pub instructions: &'static str,
}

impl From<&ExerciseTemplate> for ExerciseSpec {
    fn from(t: &ExerciseTemplate) -> Self {
        Self {
            id: Some(t.id),
            name: t.name.to_string(),
            sets: t.sets,
            kind: t.kind,
            category: t.category,
            is_light: t.is_light,
            starting_weight: t.starting_weight,
            instructions: t.instructions,
        }
    }
}

impl From<ExerciseId> for ExerciseSpec {
    fn from(id: ExerciseId) -> Self {
        id.template().into()
    }
}

pub fn find_exercise(name: &str) -> Option<&'static ExerciseTemplate> {
    ExerciseId::from_name(name).map(ExerciseId::template)
}

/// Resolve a name to a definition.
///
/// Names outside the catalog never fail: anything containing "Stretch"
/// becomes a 1x30s stretch, everything else a 3x8 upper-body strength
/// exercise.
pub fn resolve_exercise(name: &str) -> ExerciseSpec {
    if let Some(template) = find_exercise(name) {
        return template.into();
    }

    if name.contains("Stretch") {
        ExerciseSpec {
            id: None,
            name: name.to_string(),
            sets: 1,
            kind: ExerciseKind::Stretch { hold_secs: 30 },
            category: Category::None,
            is_light: true,
            starting_weight: 0.0,
            instructions: "",
        }
    } else {
        ExerciseSpec {
            id: None,
            name: name.to_string(),
            sets: 3,
            kind: ExerciseKind::Strength { reps: 8 },
            category: Category::Upper,
            is_light: false,
            starting_weight: CUSTOM_STARTING_WEIGHT,
            instructions: "",
        }
    }
}
