//! Static narrative data: the learning-skill phrase corpus and the default
//! course-code → teacher lookup.
//!
//! Both are immutable configuration injected into the context builder at
//! construction; a school can substitute its own corpus without code
//! changes.

use std::collections::HashMap;

use lazy_static::lazy_static;

use super::skills::{SkillDomain, SkillLevel};

pub type CorpusEntry = (SkillDomain, SkillLevel, &'static [&'static str]);

const PHRASES: &[CorpusEntry] = &[
    (
        SkillDomain::Responsibility,
        SkillLevel::Excellent,
        &[
            "Fulfils responsibilities and commitments consistently and without reminders.",
            "Takes full ownership of deadlines and submits polished work on time.",
            "Can always be relied upon to complete assigned tasks to a high standard.",
        ],
    ),
    (
        SkillDomain::Responsibility,
        SkillLevel::Good,
        &[
            "Fulfils responsibilities and meets deadlines with only occasional reminders.",
            "Generally completes assigned work on time and to expectations.",
            "Manages commitments well across most classroom activities.",
        ],
    ),
    (
        SkillDomain::Responsibility,
        SkillLevel::Satisfactory,
        &[
            "Completes assigned work with support and frequent reminders.",
            "Is developing more consistent habits around deadlines and commitments.",
            "Meets some responsibilities but needs encouragement to finish tasks.",
        ],
    ),
    (
        SkillDomain::Organization,
        SkillLevel::Excellent,
        &[
            "Devises and follows a thorough plan for every task, managing time expertly.",
            "Keeps materials, notes and schedules in exemplary order.",
            "Prioritizes competing demands effectively and never loses track of work.",
        ],
    ),
    (
        SkillDomain::Organization,
        SkillLevel::Good,
        &[
            "Organizes materials and time well for most tasks.",
            "Usually follows a workable plan and meets checkpoints.",
            "Keeps coursework in good order with minimal guidance.",
        ],
    ),
    (
        SkillDomain::Organization,
        SkillLevel::Satisfactory,
        &[
            "Is learning to plan tasks and manage time with teacher support.",
            "Keeps materials in adequate order but benefits from structure.",
            "Needs prompting to break larger tasks into manageable steps.",
        ],
    ),
    (
        SkillDomain::WorkHabits,
        SkillLevel::Excellent,
        &[
            "Works independently and stays focused through the most demanding tasks.",
            "Uses class time exceptionally well and perseveres through challenges.",
            "Sets a strong example of diligent, self-directed work.",
        ],
    ),
    (
        SkillDomain::WorkHabits,
        SkillLevel::Good,
        &[
            "Uses class time productively and stays on task most of the period.",
            "Works steadily with occasional redirection.",
            "Shows sound independent work habits across most activities.",
        ],
    ),
    (
        SkillDomain::WorkHabits,
        SkillLevel::Satisfactory,
        &[
            "Stays on task for short stretches and is building stamina for longer work.",
            "Uses class time adequately when expectations are restated.",
            "Benefits from check-ins to sustain focus on independent work.",
        ],
    ),
    (
        SkillDomain::Collaboration,
        SkillLevel::Excellent,
        &[
            "Promotes positive interaction within the group and shares leadership naturally.",
            "Works with all classmates respectfully and draws out quieter voices.",
            "Resolves group conflicts constructively and keeps teams on track.",
        ],
    ),
    (
        SkillDomain::Collaboration,
        SkillLevel::Good,
        &[
            "Works well in groups and contributes a fair share of the effort.",
            "Listens to teammates and responds to their ideas respectfully.",
            "Cooperates readily in pair and group settings.",
        ],
    ),
    (
        SkillDomain::Collaboration,
        SkillLevel::Satisfactory,
        &[
            "Participates in group work when roles are clearly assigned.",
            "Is developing the habit of listening to and building on others' ideas.",
            "Contributes to teams more consistently with teacher facilitation.",
        ],
    ),
    (
        SkillDomain::Initiative,
        SkillLevel::Excellent,
        &[
            "Seeks out new learning opportunities and approaches challenges with curiosity.",
            "Frequently extends work beyond requirements and asks probing questions.",
            "Demonstrates a genuine drive to deepen understanding independently.",
        ],
    ),
    (
        SkillDomain::Initiative,
        SkillLevel::Good,
        &[
            "Approaches new tasks willingly and asks questions when curious.",
            "Shows interest in extending work beyond minimum expectations.",
            "Takes on classroom opportunities with encouragement.",
        ],
    ),
    (
        SkillDomain::Initiative,
        SkillLevel::Satisfactory,
        &[
            "Engages with new tasks when given a clear starting point.",
            "Is encouraged to ask more questions and pursue ideas independently.",
            "Shows emerging initiative in familiar contexts.",
        ],
    ),
    (
        SkillDomain::SelfRegulation,
        SkillLevel::Excellent,
        &[
            "Sets ambitious goals, monitors progress carefully and perseveres to meet them.",
            "Reflects on feedback thoughtfully and adjusts strategies immediately.",
            "Manages frustration well and maintains effort through setbacks.",
        ],
    ),
    (
        SkillDomain::SelfRegulation,
        SkillLevel::Good,
        &[
            "Sets goals and works toward them with occasional guidance.",
            "Responds to feedback and usually adapts the next attempt.",
            "Maintains effort on challenging tasks most of the time.",
        ],
    ),
    (
        SkillDomain::SelfRegulation,
        SkillLevel::Satisfactory,
        &[
            "Is learning to set realistic goals and track progress toward them.",
            "Accepts feedback and applies it with support.",
            "Builds persistence on challenging tasks with encouragement.",
        ],
    ),
];

/// Per-domain, per-level phrase bank consulted by comment generation.
#[derive(Debug, Clone)]
pub struct PhraseCorpus {
    phrases: HashMap<(SkillDomain, SkillLevel), Vec<&'static str>>,
}

impl PhraseCorpus {
    pub fn from_entries(entries: &[CorpusEntry]) -> Self {
        let mut phrases: HashMap<(SkillDomain, SkillLevel), Vec<&'static str>> = HashMap::new();
        for (domain, level, options) in entries {
            phrases
                .entry((*domain, *level))
                .or_default()
                .extend_from_slice(options);
        }
        Self { phrases }
    }

    pub fn phrases(&self, domain: SkillDomain, level: SkillLevel) -> &[&'static str] {
        self.phrases
            .get(&(domain, level))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for PhraseCorpus {
    fn default() -> Self {
        Self::from_entries(PHRASES)
    }
}

lazy_static! {
    /// Fallback teacher names keyed by course code; consulted when no
    /// per-enrollment override is supplied.
    pub static ref DEFAULT_TEACHERS: HashMap<&'static str, &'static str> = {
        HashMap::from([
            ("ASM2O", "Emily Dawson"),
            ("AVI2O", "Jacob Whitman"),
            ("BAF3M", "Laura Bennett"),
            ("BAT4M", "Nathan Harris"),
            ("BBB4M", "Olivia Sanders"),
            ("BEP2O", "William Turner"),
            ("BOH4M", "Ashley Reed"),
            ("CHC2D", "Kevin Brooks"),
            ("CHV2O", "Megan Sullivan"),
            ("CIA4U", "Ryan Webster"),
            ("ENG3U", "Samantha Fraser"),
            ("ENG4U", "Thomas Blake"),
            ("ESLBO", "Julia Morton"),
            ("ESLCO", "Henry Patterson"),
            ("ESLDO", "Chloe Matthews"),
            ("ESLEO", "Liam Campbell"),
            ("GLC2O", "Nicole Jenkins"),
            ("HHS4U", "Andrew Clarke"),
            ("HSB4U", "Sophie Richardson"),
            ("LKBDU", "Mark Douglas"),
            ("MCR3U", "Natalie Graham"),
            ("MCV4U", "Stephen Moore"),
            ("MDM4U", "Isabelle Long"),
            ("MHF4U", "Benjamin Scott"),
            ("MPM2D", "Caroline Lewis"),
            ("OLC4O", "Zachary Palmer"),
            ("SBI3U", "Hailey Morgan"),
            ("SBI4U", "Peter Adams"),
            ("SCH3U", "Victoria Ellis"),
            ("SCH4U", "Daniel Carter"),
            ("SNC2D", "Brianna Taylor"),
            ("SPH3U", "Eric Thompson"),
            ("SPH4U", "Rachel Stevens"),
        ])
    };
}

/// Owned copy of the default teacher table, suitable for injection into the
/// context builder.
pub fn default_teachers() -> HashMap<String, String> {
    DEFAULT_TEACHERS
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect()
}
