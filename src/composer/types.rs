//! Closed vocabularies used by the composition workflow
//!
//! Campaign types, audiences, revision modifiers, subject-line hooks,
//! themes, free-chat intents and quick actions. Each enum round-trips
//! through its wire key with `parse_str`/`key` and has a display label.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary goal of a campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignType {
    /// Time-limited discount
    FlashSale,
    /// Regular news roundup
    Newsletter,
    /// Onboarding sequence
    Welcome,
    /// New product announcement
    ProductLaunch,
    /// Event invitation
    Event,
    /// Anything else
    Other,
}

impl CampaignType {
    /// All campaign types in menu order
    pub const ALL: [CampaignType; 6] = [
        Self::FlashSale,
        Self::Newsletter,
        Self::Welcome,
        Self::ProductLaunch,
        Self::Event,
        Self::Other,
    ];

    /// Parse a campaign type from its key
    ///
    /// # Examples
    ///
    /// ```
    /// use campaign_composer::composer::CampaignType;
    ///
    /// assert_eq!(CampaignType::parse_str("flash_sale").unwrap(), CampaignType::FlashSale);
    /// assert!(CampaignType::parse_str("black_friday").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "flash_sale" => Ok(Self::FlashSale),
            "newsletter" => Ok(Self::Newsletter),
            "welcome" => Ok(Self::Welcome),
            "product_launch" => Ok(Self::ProductLaunch),
            "event" => Ok(Self::Event),
            "other" => Ok(Self::Other),
            other => Err(format!("Unknown campaign type: {}", other)),
        }
    }

    /// Wire key
    pub fn key(&self) -> &'static str {
        match self {
            Self::FlashSale => "flash_sale",
            Self::Newsletter => "newsletter",
            Self::Welcome => "welcome",
            Self::ProductLaunch => "product_launch",
            Self::Event => "event",
            Self::Other => "other",
        }
    }

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            Self::FlashSale => "Flash Sale",
            Self::Newsletter => "Newsletter",
            Self::Welcome => "Welcome Series",
            Self::ProductLaunch => "Product Launch",
            Self::Event => "Event Invite",
            Self::Other => "Custom Campaign",
        }
    }

    /// Label used inside prompts
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Self::Other => "Campaign",
            _ => self.label(),
        }
    }

    /// Menu icon
    pub fn icon(&self) -> &'static str {
        match self {
            Self::FlashSale => "🔥",
            Self::Newsletter => "📰",
            Self::Welcome => "👋",
            Self::ProductLaunch => "🚀",
            Self::Event => "🎉",
            Self::Other => "💡",
        }
    }

    /// Tone the body copy should take
    pub fn tone(&self) -> &'static str {
        match self {
            Self::FlashSale => "urgent and exciting",
            Self::Newsletter => "informative and friendly",
            Self::Welcome => "warm and welcoming",
            Self::ProductLaunch => "confident and enthusiastic",
            Self::Event => "inviting and upbeat",
            Self::Other => "clear and friendly",
        }
    }

    /// Call-to-action label matched to the campaign
    pub fn cta_label(&self) -> &'static str {
        match self {
            Self::FlashSale => "Shop the Sale",
            Self::Newsletter => "Read More",
            Self::Welcome => "Get Started",
            Self::ProductLaunch => "Discover It Now",
            Self::Event => "Reserve Your Spot",
            Self::Other => "Learn More",
        }
    }
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Who receives the email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceType {
    /// Loyal, high-value customers
    Vip,
    /// Everyone on the list
    Subscribers,
    /// Recently joined users
    New,
    /// Leads who have not engaged
    Cold,
    /// A custom segment
    Custom,
}

impl AudienceType {
    /// All audiences in menu order
    pub const ALL: [AudienceType; 5] = [
        Self::Vip,
        Self::Subscribers,
        Self::New,
        Self::Cold,
        Self::Custom,
    ];

    /// Parse an audience from its key
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "vip" => Ok(Self::Vip),
            "subscribers" => Ok(Self::Subscribers),
            "new" => Ok(Self::New),
            "cold" => Ok(Self::Cold),
            "custom" => Ok(Self::Custom),
            other => Err(format!("Unknown audience: {}", other)),
        }
    }

    /// Wire key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Vip => "vip",
            Self::Subscribers => "subscribers",
            Self::New => "new",
            Self::Cold => "cold",
            Self::Custom => "custom",
        }
    }

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Vip => "VIP Customers",
            Self::Subscribers => "All Subscribers",
            Self::New => "New Users",
            Self::Cold => "Cold Leads",
            Self::Custom => "Custom Segment",
        }
    }

    /// Description used inside prompts
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Self::Vip => "VIP loyal customers",
            Self::Subscribers => "email subscribers",
            Self::New => "new users",
            Self::Cold => "cold leads who haven't engaged",
            Self::Custom => "custom audience segment",
        }
    }

    /// Menu icon
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Vip => "👑",
            Self::Subscribers => "📧",
            Self::New => "🆕",
            Self::Cold => "❄️",
            Self::Custom => "✨",
        }
    }
}

impl fmt::Display for AudienceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Revision requested for a set of subject lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// Playful, punny
    Funnier,
    /// At most 30 characters
    Shorter,
    /// No hard sell
    LessSalesy,
}

impl Modifier {
    /// All modifiers in menu order
    pub const ALL: [Modifier; 3] = [Self::Funnier, Self::Shorter, Self::LessSalesy];

    /// Hard length cap for `Shorter` candidates
    pub const SHORT_LIMIT: usize = 30;

    /// Parse a modifier from its key
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "funnier" => Ok(Self::Funnier),
            "shorter" => Ok(Self::Shorter),
            "less_salesy" => Ok(Self::LessSalesy),
            other => Err(format!("Unknown revision modifier: {}", other)),
        }
    }

    /// Wire key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Funnier => "funnier",
            Self::Shorter => "shorter",
            Self::LessSalesy => "less_salesy",
        }
    }

    /// Chip label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Funnier => "Make it funnier",
            Self::Shorter => "Make it shorter",
            Self::LessSalesy => "Less salesy",
        }
    }

    /// Returns true if `text` satisfies the modifier's hard constraints
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            Self::Shorter => text.chars().count() <= Self::SHORT_LIMIT,
            Self::Funnier | Self::LessSalesy => true,
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Psychological angle of a subject-line candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hook {
    /// What's in it for the reader
    #[serde(rename = "Benefit-Driven")]
    BenefitDriven,
    /// Open loop
    #[serde(rename = "Curiosity-Driven")]
    CuriosityDriven,
    /// Fear of missing out
    #[serde(rename = "Urgency/Scarcity")]
    UrgencyScarcity,
}

impl Hook {
    /// Hooks in candidate order
    pub const ALL: [Hook; 3] = [
        Self::BenefitDriven,
        Self::CuriosityDriven,
        Self::UrgencyScarcity,
    ];

    /// Hook for the candidate at `position`
    pub fn for_position(position: usize) -> Self {
        Self::ALL[position % Self::ALL.len()]
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::BenefitDriven => "Benefit-Driven",
            Self::CuriosityDriven => "Curiosity-Driven",
            Self::UrgencyScarcity => "Urgency/Scarcity",
        }
    }

    /// Colored tag for terminal output
    pub fn colored_tag(&self) -> String {
        match self {
            Self::BenefitDriven => format!("[{}]", self.label().green()),
            Self::CuriosityDriven => format!("[{}]", self.label().magenta()),
            Self::UrgencyScarcity => format!("[{}]", self.label().red()),
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Named visual theme applied by restyling the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeStyle {
    /// White space, clean type
    Minimalist,
    /// Vibrant brand colors
    Bold,
    /// Serif, gold and black
    Luxury,
    /// Dark background
    Dark,
}

impl ThemeStyle {
    /// All themes in menu order
    pub const ALL: [ThemeStyle; 4] = [Self::Minimalist, Self::Bold, Self::Luxury, Self::Dark];

    /// Parse a theme from its key
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "minimalist" => Ok(Self::Minimalist),
            "bold" => Ok(Self::Bold),
            "luxury" => Ok(Self::Luxury),
            "dark" => Ok(Self::Dark),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }

    /// Wire key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Minimalist => "minimalist",
            Self::Bold => "bold",
            Self::Luxury => "luxury",
            Self::Dark => "dark",
        }
    }

    /// Menu label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Minimalist => "⚪ Minimalist",
            Self::Bold => "🟣 Bold & Colorful",
            Self::Luxury => "✨ Luxury",
            Self::Dark => "⚫ Dark Mode",
        }
    }

    /// Fixed restyling instruction
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Minimalist => "Apply a Minimalist theme: Uses lots of white space, clean sans-serif fonts, black text, and subtle gray accents. Simple and elegant.",
            Self::Bold => "Apply a Bold theme: Use vibrant primary brand colors (Indigo/Cyan) for backgrounds and buttons. Large headings, high contrast. Energetic vibe.",
            Self::Luxury => "Apply a Luxury theme: Use serif headings (Playfair Display or similar), gold/black/cream color palette. Sophisticated and high-end feel.",
            Self::Dark => "Apply a Dark Mode theme: Dark background (#1a1a1a), light text (#f0f0f0). High contrast accents. Modern and sleek.",
        }
    }
}

impl fmt::Display for ThemeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Authoring intent of a free-chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// HTML or formatting work
    Styling,
    /// Subject line work
    Subject,
    /// Body copy work
    Body,
    /// Images
    Image,
    /// Refinement of existing content
    Improve,
    /// Anything else
    General,
}

impl Intent {
    /// Wire key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Styling => "styling",
            Self::Subject => "subject",
            Self::Body => "body",
            Self::Image => "image",
            Self::Improve => "improve",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// One-shot generation shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuickAction {
    /// Write a full email for the section
    GenerateCopy,
    /// Build a responsive HTML template in brand colors
    GenerateHtml,
    /// Review and improve the current copy
    Improve,
}

impl QuickAction {
    /// All quick actions
    pub const ALL: [QuickAction; 3] = [Self::GenerateCopy, Self::GenerateHtml, Self::Improve];

    /// Parse a quick action from its key
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "generate-copy" | "copy" => Ok(Self::GenerateCopy),
            "generate-html" | "html" => Ok(Self::GenerateHtml),
            "improve" => Ok(Self::Improve),
            other => Err(format!("Unknown quick action: {}", other)),
        }
    }

    /// Wire key
    pub fn key(&self) -> &'static str {
        match self {
            Self::GenerateCopy => "generate-copy",
            Self::GenerateHtml => "generate-html",
            Self::Improve => "improve",
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
