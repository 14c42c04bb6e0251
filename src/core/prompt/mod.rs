pub mod composer;
pub mod guard;
pub mod selection;
pub mod synthesis;
pub mod templates;

pub use composer::{Effect, InfluenceRule, PromptComposer, REFERENCE_RULES, Slot};
pub use guard::{GuardPolicy, GuardPreset, GuardVerdict, sanitize};
pub use selection::{WeightedOption, weighted_choice, weighted_sample};
pub use synthesis::{
    GeneratorFuture, PromptSynthesizer, RunHandle, RunMessage, RunState, RunStatus,
    SynthesisSettings, TextGenerator,
};
pub use templates::{ASSISTANT_SYSTEM, TemplateCategory};
