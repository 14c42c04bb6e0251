//! Read-only vocabulary for the leatherwear prompt composer.
//!
//! Every table is a process-wide `&'static` slice; nothing here is mutated at
//! runtime. Weights default to 1.0 via [`WeightedOption::unit`].

use super::selection::WeightedOption;

/// A named, ordered vocabulary table.
#[derive(Debug, Clone, Copy)]
pub struct TemplateCategory {
    pub name: &'static str,
    pub options: &'static [WeightedOption],
}

impl TemplateCategory {
    /// Subset of this category whose values contain any of `keywords`.
    pub fn filter_containing(&self, keywords: &[&str]) -> Vec<WeightedOption> {
        self.options
            .iter()
            .copied()
            .filter(|option| keywords.iter().any(|kw| option.value.contains(kw)))
            .collect()
    }
}

const fn w(value: &'static str, weight: f64) -> WeightedOption {
    WeightedOption::new(value, weight)
}

const fn u(value: &'static str) -> WeightedOption {
    WeightedOption::unit(value)
}

/// System instruction for the language model.
pub const ASSISTANT_SYSTEM: &str = "You are a fashion prompt generator specialized in tasteful, SFW women's leatherwear. \
Provide exactly one vivid text-to-image prompt for each request. Describe the outfit, the model, and the scene with an \
editorial tone that highlights leather materials, textures, construction, and styling details. Mention pose, lighting, \
and camera mood without dictating rigid settings. Avoid brand names and copyrighted characters. Keep every depiction \
mature and safe-for-work. Respond with a single paragraph of plain text and no additional framing.";

pub const INTRO_SENTENCE: &str = "Craft a single SFW text-to-image prompt in English for a women's leather fashion image, \
blending outfit, model, setting, and atmosphere into one flowing paragraph.";

pub const SAFETY_SENTENCE: &str = "Keep the description mature, tasteful, and focused on leather craftsmanship \
without mentioning brands or explicit content.";

/// Sentinel values meaning "leave this slot out of the outfit".
pub const NO_HEADWEAR: &str = "no headwear";
pub const NO_OUTER_LAYER: &str = "no outer layer";
pub const NO_HOSIERY: &str = "no hosiery";

pub const HEADWEAR: TemplateCategory = TemplateCategory {
    name: "headwear",
    options: &[
        w("a sculpted leather beret", 1.0),
        w("a structured leather cap", 0.9),
        w("a softly draped hood", 0.7),
        w("a cropped leather flight hood", 0.4),
        w(NO_HEADWEAR, 1.5),
        w("a ribbed knit beanie with leather piping", 0.5),
    ],
};

pub const HAIR: TemplateCategory = TemplateCategory {
    name: "hair",
    options: &[
        w("sleek low ponytail", 1.1),
        w("soft brushed-out waves", 1.2),
        w("sharp blunt bob", 0.9),
        w("braided crown", 0.7),
        w("wet-look sculpted hair", 0.6),
        w("glossy side-parted lob", 0.8),
    ],
};

pub const NECKLINES: TemplateCategory = TemplateCategory {
    name: "necklines",
    options: &[
        u("turtleneck"),
        u("stand collar"),
        u("notch lapel"),
        u("shawl collar"),
        u("mandarin collar"),
        w("halter neckline", 0.7),
        w("sweetheart neckline", 0.8),
    ],
};

pub const OUTERWEAR: TemplateCategory = TemplateCategory {
    name: "outerwear",
    options: &[
        u("cropped biker jacket"),
        u("tailored blazer with structured shoulders"),
        w("storm-flap trench coat", 0.9),
        w("belted trench coat with epaulets", 0.8),
        w("flying jacket with shearling lining", 0.6),
        w("minimalist leather duster", 0.5),
        w(NO_OUTER_LAYER, 1.2),
    ],
};

pub const CORSETRY: TemplateCategory = TemplateCategory {
    name: "corsetry",
    options: &[
        u("structured corset"),
        u("contoured bustier"),
        u("sleek waist cincher"),
        u("leather harness"),
        u("boned bustier top"),
    ],
};

pub const TOPS: TemplateCategory = TemplateCategory {
    name: "tops",
    options: &[
        u("fitted leather shirt"),
        u("ribbed knit underlayer"),
        w("camisole with leather trim", 0.8),
        u("matte leather bodysuit"),
        u("structured bustier top"),
        w("tube top with leather edging", 0.6),
    ],
};

pub const DRESSES: TemplateCategory = TemplateCategory {
    name: "dresses",
    options: &[
        u("sheath dress"),
        u("A-line mini dress"),
        u("pencil midi dress"),
        u("slip-inspired dress with tonal lining"),
        u("wrap dress"),
        u("panelled shirt dress"),
    ],
};

pub const BOTTOMS: TemplateCategory = TemplateCategory {
    name: "bottoms",
    options: &[
        u("high-waist pencil skirt"),
        u("A-line skirt"),
        u("knife-pleated skirt"),
        u("tailored trousers"),
        u("cigarette pants"),
        u("flared trousers"),
        w("opaque leather leggings", 0.8),
    ],
};

pub const HOSIERY: TemplateCategory = TemplateCategory {
    name: "hosiery",
    options: &[
        u("opaque tights"),
        w("fishnet underlayer tights", 0.6),
        w("thigh-high socks", 0.7),
        w("leather-paneled leggings", 0.5),
        w(NO_HOSIERY, 1.1),
    ],
};

pub const FOOTWEAR: TemplateCategory = TemplateCategory {
    name: "footwear",
    options: &[
        u("ankle boots"),
        u("knee-high boots"),
        u("over-the-knee boots"),
        u("platform boots"),
        u("heeled sandals with leather straps"),
        u("pointed-toe pumps"),
    ],
};

pub const GLOVES_AND_SMALL_GOODS: TemplateCategory = TemplateCategory {
    name: "gloves_and_small_goods",
    options: &[
        w("opera-length gloves", 0.6),
        w("sleek driving gloves", 0.8),
        w("fingerless gloves", 0.5),
        u("structured mini bag"),
        u("belt bag with polished hardware"),
    ],
};

pub const ACCESSORIES: TemplateCategory = TemplateCategory {
    name: "accessories",
    options: &[
        u("slim belt with a statement buckle"),
        u("choker necklace"),
        u("cuff bracelet"),
        u("layered chain necklaces"),
        u("minimal drop earrings"),
        w("sculptural ear cuffs", 0.6),
    ],
};

pub const LEATHER_FINISHES: TemplateCategory = TemplateCategory {
    name: "leather_finishes",
    options: &[
        u("full-grain leather with a softly burnished surface"),
        u("top-grain leather with subtle sheen"),
        u("aniline leather that feels plush"),
        u("semi-aniline leather with a gentle glow"),
        w("patent leather with high-gloss reflectivity", 0.7),
        w("lacquered leather with mirror shine", 0.5),
        u("matte nubuck leather"),
        u("buttery nappa leather"),
        u("pebble-grain leather"),
        u("suede with velvety touch"),
        u("embossed crocodile leather"),
        u("embossed snakeskin leather"),
        w("embossed lizard texture", 0.7),
        w("quilted leather panels", 0.6),
        w("perforated leather sections", 0.5),
    ],
};

pub const COLOR_PALETTE: TemplateCategory = TemplateCategory {
    name: "color_palette",
    options: &[
        u("deep black"),
        u("oxblood"),
        u("cognac"),
        u("forest green"),
        u("midnight blue"),
        u("ivory"),
        u("charcoal"),
        u("steel gray"),
        u("burgundy"),
        u("bone"),
        u("camel"),
    ],
};

pub const HARDWARE: TemplateCategory = TemplateCategory {
    name: "hardware",
    options: &[
        u("two-way zipper"),
        u("asymmetric zip"),
        u("polished D-rings"),
        u("snap closures"),
        u("riveted straps"),
        u("hook-and-eye set"),
        u("grommet lacing"),
        u("buckled tabs"),
    ],
};

pub const DETAILING: TemplateCategory = TemplateCategory {
    name: "detailing",
    options: &[
        u("precise paneling"),
        u("contoured darting"),
        u("corsetry boning"),
        u("lacing that cinches the waist"),
        u("pick-stitched edges"),
        u("tonal topstitching"),
        u("quilted channels"),
        u("piping that traces the seams"),
        u("welt pockets"),
        u("vent detailing"),
        u("articulated sleeves"),
        u("storm flaps"),
        u("gusset inserts"),
    ],
};

pub const FIT_AND_SILHOUETTE: TemplateCategory = TemplateCategory {
    name: "fit_and_silhouette",
    options: &[
        u("tailored silhouette"),
        u("bodycon fit"),
        w("relaxed drape", 0.8),
        w("boxy proportion", 0.6),
        u("cinched waist"),
        u("hourglass emphasis"),
        u("column line"),
        u("A-line flare"),
        u("flared hem"),
        u("structured shoulders"),
    ],
};

pub const POSES: TemplateCategory = TemplateCategory {
    name: "poses",
    options: &[
        u("a confident contrapposto pose"),
        u("a mid-turn movement"),
        u("a walking stride"),
        u("a seated edge pose"),
        u("a hand-in-pocket stance"),
        w("an adjusting-the-lapel gesture", 0.8),
    ],
};

pub const SCENES: TemplateCategory = TemplateCategory {
    name: "scenes",
    options: &[
        u("studio seamless backdrop"),
        u("textured plaster wall"),
        u("concrete loft interior"),
        u("moody runway reflection"),
        u("city rooftop at dusk"),
        u("modern corridor"),
        u("gallery space"),
    ],
};

pub const LIGHTING: TemplateCategory = TemplateCategory {
    name: "lighting",
    options: &[
        u("soft daylight"),
        u("rim light accents"),
        u("moody chiaroscuro"),
        u("diffused key light"),
        u("subtle backlight glow"),
    ],
};

pub const CAMERA_AND_LENS: TemplateCategory = TemplateCategory {
    name: "camera_and_lens",
    options: &[
        u("85mm portrait perspective"),
        u("gentle film grain"),
        u("shallow depth of field"),
        u("medium-format clarity"),
        u("slight motion blur"),
    ],
};

pub const STYLE_DIRECTION: TemplateCategory = TemplateCategory {
    name: "style_direction",
    options: &[
        u("minimalist"),
        u("sculptural"),
        u("refined"),
        u("bold"),
        u("modern noir"),
        u("neo-romantic"),
        u("cyber-chic"),
        u("retro-futurist"),
        u("utility-luxe"),
    ],
};

// Short connective phrases used when assembling sentences.
pub const WAIST_PHRASES: &[&str] = &["cinched waist", "waist emphasis", "belted silhouette"];
pub const FITTED_BASE_PHRASES: &[&str] = &[
    "over a fitted base layer",
    "over a fine-gauge knit",
    "over the tonal underlayer",
];
pub const FOOTWEAR_LEADS: &[&str] = &[
    "Grounding the look,",
    "Anchoring the stance,",
    "She finishes with",
    "Balancing it below,",
];
pub const JEWELRY_TONES: &[&str] = &["considered", "refined", "purposeful"];
pub const HAIR_DESCRIPTORS: &[&str] = &["slick", "refined", "luminous"];
pub const TEXTURE_VERBS: &[&str] = &["mirrors", "contrasts", "echoes"];
