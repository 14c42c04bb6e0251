//! Randomized instruction composer.
//!
//! Draws one value (or a small sample) from each vocabulary table, applies the
//! conditional coupling rules, renders descriptive sentences and shuffles them
//! behind a fixed intro and safety line.

use super::selection::{WeightedOption, weighted_choice, weighted_sample};
use super::templates::{
    self, ACCESSORIES, BOTTOMS, CAMERA_AND_LENS, COLOR_PALETTE, CORSETRY, DETAILING, DRESSES,
    FIT_AND_SILHOUETTE, FOOTWEAR, GLOVES_AND_SMALL_GOODS, HAIR, HARDWARE, HEADWEAR, HOSIERY,
    LEATHER_FINISHES, LIGHTING, NECKLINES, NO_HEADWEAR, NO_HOSIERY, NO_OUTER_LAYER, OUTERWEAR,
    POSES, SCENES, STYLE_DIRECTION, TOPS, TemplateCategory,
};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::HashMap;

const DRESS_PROBABILITY: f64 = 0.45;
const CORSETRY_PROBABILITY: f64 = 0.55;
const CORSET_UNDER_OUTERWEAR_PROBABILITY: f64 = 0.6;

/// Outfit slots that coupling rules can read from or act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Outerwear,
    Finish,
    Lighting,
    Scene,
    Top,
    Corsetry,
    Detailing,
}

/// What a triggered rule does to its target slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// With `probability`, draw from the options containing any `subpool`
    /// keyword instead of the whole category. Skipped when that subpool is empty.
    Bias {
        subpool: &'static [&'static str],
        probability: f64,
    },
    /// Replace a drawn value containing `matching` with `replacement`.
    Substitute {
        matching: &'static str,
        replacement: &'static str,
    },
    /// Remove options containing `matching` before drawing.
    Exclude { matching: &'static str },
}

/// Declarative coupling between two slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfluenceRule {
    pub source: Slot,
    pub triggers: &'static [&'static str],
    pub target: Slot,
    pub effect: Effect,
}

impl InfluenceRule {
    fn fires(&self, chosen: &Chosen) -> bool {
        chosen
            .get(&self.source)
            .is_some_and(|value| self.triggers.iter().any(|kw| value.contains(kw)))
    }
}

const DRAMATIC_FINISH: &[&str] = &["patent", "lacquer", "high-gloss", "mirror"];
const POLISHED_OUTERWEAR: &[&str] = &["trench", "tailored"];

pub const REFERENCE_RULES: &[InfluenceRule] = &[
    InfluenceRule {
        source: Slot::Finish,
        triggers: DRAMATIC_FINISH,
        target: Slot::Lighting,
        effect: Effect::Bias {
            subpool: &["rim", "moody", "backlight"],
            probability: 1.0,
        },
    },
    InfluenceRule {
        source: Slot::Finish,
        triggers: DRAMATIC_FINISH,
        target: Slot::Scene,
        effect: Effect::Bias {
            subpool: &["runway", "rooftop"],
            probability: 0.6,
        },
    },
    InfluenceRule {
        source: Slot::Outerwear,
        triggers: POLISHED_OUTERWEAR,
        target: Slot::Top,
        effect: Effect::Substitute {
            matching: "tube",
            replacement: "matte leather bodysuit",
        },
    },
    InfluenceRule {
        source: Slot::Outerwear,
        triggers: POLISHED_OUTERWEAR,
        target: Slot::Corsetry,
        effect: Effect::Substitute {
            matching: "harness",
            replacement: "structured corset",
        },
    },
    InfluenceRule {
        source: Slot::Outerwear,
        triggers: POLISHED_OUTERWEAR,
        target: Slot::Detailing,
        effect: Effect::Exclude {
            matching: "storm flaps",
        },
    },
];

type Chosen = HashMap<Slot, &'static str>;

#[derive(Debug)]
enum BaseLayer {
    Dress(String),
    Separates { top: String, bottom: &'static str },
}

impl BaseLayer {
    fn reference(&self) -> &str {
        match self {
            Self::Dress(dress) => dress,
            Self::Separates { top, .. } => top,
        }
    }
}

/// Everything drawn for one instruction, before rendering.
#[derive(Debug)]
struct OutfitPlan {
    headwear: &'static str,
    hair: &'static str,
    outerwear: &'static str,
    finish: &'static str,
    color: &'static str,
    detailing: Vec<&'static str>,
    hardware: Vec<&'static str>,
    fit: &'static str,
    base: BaseLayer,
    corsetry: Option<String>,
    hosiery: &'static str,
    footwear: &'static str,
    gloves: Vec<&'static str>,
    accessories: Vec<&'static str>,
    pose: &'static str,
    scene: &'static str,
    lighting: &'static str,
    camera: Vec<&'static str>,
    style: &'static str,
}

/// Builds one natural-language instruction per call.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    rules: Vec<InfluenceRule>,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::with_rules(REFERENCE_RULES.to_vec())
    }
}

impl PromptComposer {
    pub fn with_rules(rules: Vec<InfluenceRule>) -> Self {
        Self { rules }
    }

    /// Compose with the thread-local RNG.
    pub fn compose_random(&self) -> String {
        let mut rng = rand::rng();
        self.compose(&mut rng)
    }

    /// Compose with a caller-supplied RNG; a seeded RNG gives a reproducible
    /// instruction.
    pub fn compose<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let plan = self.plan(rng);
        let mut sentences = Vec::with_capacity(12);
        sentences.push(headwear_sentence(rng, &plan));
        sentences.extend(layer_sentences(rng, &plan));
        sentences.extend(accessory_sentences(rng, &plan));
        sentences.extend(environment_sentences(&plan));
        sentences.shuffle(rng);

        let mut parts = Vec::with_capacity(sentences.len() + 2);
        parts.push(templates::INTRO_SENTENCE.to_string());
        parts.push(templates::SAFETY_SENTENCE.to_string());
        parts.extend(sentences);
        parts.join(" ")
    }

    fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> OutfitPlan {
        let mut chosen = Chosen::new();

        let outerwear = pick(rng, &OUTERWEAR);
        chosen.insert(Slot::Outerwear, outerwear);
        let headwear = pick(rng, &HEADWEAR);
        let hair = pick(rng, &HAIR);
        let finish = pick(rng, &LEATHER_FINISHES);
        chosen.insert(Slot::Finish, finish);
        let color = pick(rng, &COLOR_PALETTE);

        let detail_count = rng.random_range(2..=3);
        let detailing = self.choose_many(rng, Slot::Detailing, &DETAILING, detail_count, &chosen);
        let hardware = weighted_sample(rng, HARDWARE.options, 2);
        let fit = pick(rng, &FIT_AND_SILHOUETTE);

        let base = self.base_layer(rng, &chosen);
        let corsetry = self.corsetry(rng, outerwear, &base, &chosen);

        let hosiery = pick(rng, &HOSIERY);
        let footwear = pick(rng, &FOOTWEAR);
        let glove_count = rng.random_range(0..=2);
        let gloves = weighted_sample(rng, GLOVES_AND_SMALL_GOODS.options, glove_count);
        let accessory_count = rng.random_range(1..=2);
        let accessories = weighted_sample(rng, ACCESSORIES.options, accessory_count);
        let pose = pick(rng, &POSES);
        let scene = self.choose_one(rng, Slot::Scene, &SCENES, &chosen);
        let lighting = self.choose_one(rng, Slot::Lighting, &LIGHTING, &chosen);
        let camera = weighted_sample(rng, CAMERA_AND_LENS.options, 2);
        let style = pick(rng, &STYLE_DIRECTION);

        OutfitPlan {
            headwear,
            hair,
            outerwear,
            finish,
            color,
            detailing,
            hardware,
            fit,
            base,
            corsetry,
            hosiery,
            footwear,
            gloves,
            accessories,
            pose,
            scene,
            lighting,
            camera,
            style,
        }
    }

    fn base_layer<R: Rng + ?Sized>(&self, rng: &mut R, chosen: &Chosen) -> BaseLayer {
        if rng.random::<f64>() < DRESS_PROBABILITY {
            let dress = pick(rng, &DRESSES);
            let neckline = pick(rng, &NECKLINES);
            return BaseLayer::Dress(format!("{dress} with a {neckline}"));
        }
        let top = self.choose_one(rng, Slot::Top, &TOPS, chosen);
        let neckline = pick(rng, &NECKLINES);
        let bottom = pick(rng, &BOTTOMS);
        BaseLayer::Separates {
            top: format!("{top} featuring a {neckline}"),
            bottom,
        }
    }

    fn corsetry<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        outerwear: &str,
        base: &BaseLayer,
        chosen: &Chosen,
    ) -> Option<String> {
        if rng.random::<f64>() >= CORSETRY_PROBABILITY {
            return None;
        }
        let corset = self.choose_one(rng, Slot::Corsetry, &CORSETRY, chosen);
        if outerwear != NO_OUTER_LAYER && rng.random::<f64>() < CORSET_UNDER_OUTERWEAR_PROBABILITY {
            return Some(format!(
                "a {corset} cinched over the {} and anchored beneath the {outerwear}",
                base.reference()
            ));
        }
        let fitted = phrase(rng, templates::FITTED_BASE_PHRASES);
        Some(match base {
            BaseLayer::Dress(_) => format!("a {corset} defining the waist {fitted}"),
            BaseLayer::Separates { .. } => format!("a {corset} layered {fitted}"),
        })
    }

    fn effects_for(&self, target: Slot, chosen: &Chosen) -> Vec<Effect> {
        self.rules
            .iter()
            .filter(|rule| rule.target == target && rule.fires(chosen))
            .map(|rule| rule.effect)
            .collect()
    }

    fn choose_one<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        slot: Slot,
        category: &TemplateCategory,
        chosen: &Chosen,
    ) -> &'static str {
        let effects = self.effects_for(slot, chosen);
        let pool = excluded_pool(category, &effects);

        let mut drawn = None;
        for effect in &effects {
            let Effect::Bias {
                subpool,
                probability,
            } = effect
            else {
                continue;
            };
            let biased: Vec<WeightedOption> = pool
                .iter()
                .copied()
                .filter(|option| subpool.iter().any(|kw| option.value.contains(kw)))
                .collect();
            if biased.is_empty() {
                continue;
            }
            if *probability >= 1.0 || rng.random::<f64>() < *probability {
                drawn = weighted_choice(rng, &biased);
                break;
            }
        }

        let value = drawn
            .or_else(|| weighted_choice(rng, &pool))
            .unwrap_or_default();
        substitute(value, &effects)
    }

    fn choose_many<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        slot: Slot,
        category: &TemplateCategory,
        k: usize,
        chosen: &Chosen,
    ) -> Vec<&'static str> {
        let effects = self.effects_for(slot, chosen);
        let pool = excluded_pool(category, &effects);
        weighted_sample(rng, &pool, k)
            .into_iter()
            .map(|value| substitute(value, &effects))
            .collect()
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, category: &TemplateCategory) -> &'static str {
    weighted_choice(rng, category.options).unwrap_or_default()
}

fn phrase<R: Rng + ?Sized>(rng: &mut R, options: &[&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}

fn excluded_pool(category: &TemplateCategory, effects: &[Effect]) -> Vec<WeightedOption> {
    let pool: Vec<WeightedOption> = category
        .options
        .iter()
        .copied()
        .filter(|option| {
            !effects.iter().any(|effect| {
                matches!(effect, Effect::Exclude { matching } if option.value.contains(matching))
            })
        })
        .collect();
    if pool.is_empty() {
        category.options.to_vec()
    } else {
        pool
    }
}

fn substitute(value: &'static str, effects: &[Effect]) -> &'static str {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Substitute {
                matching,
                replacement,
            } if value.contains(matching) => Some(*replacement),
            _ => None,
        })
        .unwrap_or(value)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn headwear_sentence<R: Rng + ?Sized>(rng: &mut R, plan: &OutfitPlan) -> String {
    if plan.headwear == NO_HEADWEAR {
        let descriptor = phrase(rng, templates::HAIR_DESCRIPTORS);
        let anchor = if plan.outerwear == NO_OUTER_LAYER {
            "look"
        } else {
            plan.outerwear
        };
        return format!(
            "Her {} stays {descriptor}, echoing the lines of the {anchor}.",
            plan.hair
        );
    }
    let verb = phrase(rng, templates::TEXTURE_VERBS);
    format!(
        "{} {verb} the leather story while her {} keeps the profile precise.",
        capitalize(plan.headwear),
        plan.hair
    )
}

fn layer_sentences<R: Rng + ?Sized>(rng: &mut R, plan: &OutfitPlan) -> Vec<String> {
    let mut sentences = Vec::with_capacity(4);
    let material = format!("{} {}", plan.color, plan.finish);

    if plan.outerwear != NO_OUTER_LAYER {
        let waist = phrase(rng, templates::WAIST_PHRASES);
        let detail = phrase(rng, &plan.detailing);
        let hardware = phrase(rng, &plan.hardware);
        sentences.push(format!(
            "She shrugs into a {} crafted in {material}, its {detail} and {hardware} adding {waist}.",
            plan.outerwear
        ));
    }

    match &plan.base {
        BaseLayer::Dress(dress) => {
            let details = plan
                .detailing
                .iter()
                .take(2)
                .copied()
                .collect::<Vec<_>>()
                .join(", ");
            sentences.push(format!(
                "Underneath sits a {dress} rendered in {material}, carrying {details} for {}.",
                plan.fit
            ));
        }
        BaseLayer::Separates { top, bottom } => {
            sentences.push(format!(
                "The {top} is cut from {material}, balanced by {} lines.",
                plan.fit
            ));
            let detail = phrase(rng, &plan.detailing);
            let hardware = phrase(rng, &plan.hardware);
            sentences.push(format!(
                "She pairs it with a {bottom} tailored in the same {} tone, finished with {detail} and accented by {hardware}.",
                plan.color
            ));
        }
    }

    if let Some(corsetry) = &plan.corsetry {
        sentences.push(format!(
            "Completing the midsection is {corsetry}, ensuring the look stays impeccably SFW while highlighting structure."
        ));
    }
    sentences
}

fn accessory_sentences<R: Rng + ?Sized>(rng: &mut R, plan: &OutfitPlan) -> Vec<String> {
    let mut sentences = Vec::with_capacity(4);
    if plan.hosiery != NO_HOSIERY {
        sentences.push(format!(
            "Layered beneath, {} bring texture continuity down the legs.",
            plan.hosiery
        ));
    }
    let lead = phrase(rng, templates::FOOTWEAR_LEADS);
    sentences.push(format!(
        "{lead} {} maintain the leather narrative.",
        plan.footwear
    ));
    if !plan.gloves.is_empty() {
        sentences.push(format!(
            "Small leather goods include {}.",
            plan.gloves.join(", ")
        ));
    }
    if !plan.accessories.is_empty() {
        let tone = phrase(rng, templates::JEWELRY_TONES);
        sentences.push(format!(
            "Jewelry and accents stay {tone} with {}.",
            plan.accessories.join(", ")
        ));
    }
    sentences
}

fn environment_sentences(plan: &OutfitPlan) -> Vec<String> {
    vec![
        format!(
            "She holds {} within a {}, channeling a {} attitude.",
            plan.pose, plan.scene, plan.style
        ),
        format!(
            "{} and {} shape the frame with editorial clarity.",
            capitalize(plan.lighting),
            plan.camera.join(", ")
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn chosen(pairs: &[(Slot, &'static str)]) -> Chosen {
        pairs.iter().copied().collect()
    }

    #[test]
    fn compose_starts_with_intro_and_safety() {
        let mut rng = StdRng::seed_from_u64(5);
        let text = PromptComposer::default().compose(&mut rng);
        let expected_prefix = format!(
            "{} {} ",
            templates::INTRO_SENTENCE,
            templates::SAFETY_SENTENCE
        );
        assert!(text.starts_with(&expected_prefix));
        assert!(!text.contains("  "));
        assert!(!text.contains('\n'));
    }

    #[test]
    fn compose_is_reproducible_with_seed() {
        let composer = PromptComposer::default();
        let a = composer.compose(&mut StdRng::seed_from_u64(99));
        let b = composer.compose(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn compose_varies_across_seeds() {
        let composer = PromptComposer::default();
        let outputs: std::collections::HashSet<_> = (0..20)
            .map(|seed| composer.compose(&mut StdRng::seed_from_u64(seed)))
            .collect();
        assert!(outputs.len() > 15);
    }

    #[test]
    fn dramatic_finish_forces_dramatic_lighting() {
        let composer = PromptComposer::default();
        let state = chosen(&[(Slot::Finish, "patent leather with high-gloss reflectivity")]);
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let lighting = composer.choose_one(&mut rng, Slot::Lighting, &LIGHTING, &state);
            assert!(
                ["rim", "moody", "backlight"]
                    .iter()
                    .any(|kw| lighting.contains(kw)),
                "unexpected lighting {lighting}"
            );
        }
    }

    #[test]
    fn dramatic_finish_leans_toward_runway_or_rooftop() {
        let composer = PromptComposer::default();
        let state = chosen(&[(Slot::Finish, "lacquered leather with mirror shine")]);
        let mut rng = StdRng::seed_from_u64(23);
        let draws = 4_000;
        let hits = (0..draws)
            .filter(|_| {
                let scene = composer.choose_one(&mut rng, Slot::Scene, &SCENES, &state);
                scene.contains("runway") || scene.contains("rooftop")
            })
            .count();
        // 0.6 biased + 0.4 * 2/7 uniform share ≈ 0.714
        let share = hits as f64 / draws as f64;
        assert!((share - 0.714).abs() < 0.04, "share was {share}");
    }

    #[test]
    fn matte_finish_leaves_lighting_unbiased() {
        let composer = PromptComposer::default();
        let state = chosen(&[(Slot::Finish, "matte nubuck leather")]);
        let mut rng = StdRng::seed_from_u64(29);
        let saw_daylight = (0..500).any(|_| {
            composer.choose_one(&mut rng, Slot::Lighting, &LIGHTING, &state) == "soft daylight"
        });
        assert!(saw_daylight);
    }

    #[test]
    fn polished_outerwear_substitutes_tube_top() {
        const ONLY_TUBE: TemplateCategory = TemplateCategory {
            name: "tops",
            options: &[WeightedOption::unit("tube top with leather edging")],
        };
        let composer = PromptComposer::default();
        let mut rng = StdRng::seed_from_u64(1);

        let polished = chosen(&[(Slot::Outerwear, "belted trench coat with epaulets")]);
        assert_eq!(
            composer.choose_one(&mut rng, Slot::Top, &ONLY_TUBE, &polished),
            "matte leather bodysuit"
        );

        let casual = chosen(&[(Slot::Outerwear, "cropped biker jacket")]);
        assert_eq!(
            composer.choose_one(&mut rng, Slot::Top, &ONLY_TUBE, &casual),
            "tube top with leather edging"
        );
    }

    #[test]
    fn polished_outerwear_substitutes_harness() {
        const ONLY_HARNESS: TemplateCategory = TemplateCategory {
            name: "corsetry",
            options: &[WeightedOption::unit("leather harness")],
        };
        let composer = PromptComposer::default();
        let state = chosen(&[(Slot::Outerwear, "tailored blazer with structured shoulders")]);
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(
            composer.choose_one(&mut rng, Slot::Corsetry, &ONLY_HARNESS, &state),
            "structured corset"
        );
    }

    #[test]
    fn polished_outerwear_excludes_storm_flaps() {
        let composer = PromptComposer::default();
        let state = chosen(&[(Slot::Outerwear, "storm-flap trench coat")]);
        let mut rng = StdRng::seed_from_u64(3);
        let all = composer.choose_many(
            &mut rng,
            Slot::Detailing,
            &DETAILING,
            DETAILING.options.len(),
            &state,
        );
        assert_eq!(all.len(), DETAILING.options.len() - 1);
        assert!(!all.contains(&"storm flaps"));
    }

    #[test]
    fn bias_with_empty_subpool_is_skipped() {
        let rules = vec![InfluenceRule {
            source: Slot::Finish,
            triggers: &["patent"],
            target: Slot::Lighting,
            effect: Effect::Bias {
                subpool: &["neon"],
                probability: 1.0,
            },
        }];
        let composer = PromptComposer::with_rules(rules);
        let state = chosen(&[(Slot::Finish, "patent leather")]);
        let mut rng = StdRng::seed_from_u64(4);
        let lighting = composer.choose_one(&mut rng, Slot::Lighting, &LIGHTING, &state);
        assert!(LIGHTING.options.iter().any(|o| o.value == lighting));
    }

    #[test]
    fn capitalize_handles_empty_and_ascii() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("rim light"), "Rim light");
    }
}
