//! Canned assistant messages

use crate::composer::draft::{Draft, Section};
use crate::composer::types::{CampaignType, Modifier, ThemeStyle};

/// Apology for a failed free-chat request
pub const CHAT_FAILED: &str = "Sorry, I encountered an error. Please try again.";
/// Reply when the endpoint returned no usable text
pub const EMPTY_RESPONSE: &str =
    "I received an empty response. Please try rephrasing your request.";
/// Apology for a failed subject-line request
pub const SUBJECTS_FAILED: &str =
    "Sorry, I couldn't generate subject lines right now. Your selections are kept, so you can retry.";
/// Apology for a failed body request
pub const BODY_FAILED: &str =
    "I had some trouble writing the copy. Can you try giving me the key points again?";
/// Apology for a failed or rejected theme
pub const THEME_FAILED: &str = "I couldn't apply the theme. Please try again.";
/// Apology for a failed image request
pub const IMAGE_FAILED: &str = "I couldn't generate an image. Please try again or skip visuals.";
/// Shown when image generation is not configured
pub const IMAGES_DISABLED: &str =
    "Image generation isn't available here. You can upload an image or skip visuals.";
/// Shown when a request timed out
pub const TIMED_OUT: &str = "That took too long and I stopped waiting. You can retry.";

/// Context-aware greeting shown when the composer opens
///
/// Mentions the email section and suggests next steps based on which
/// fields already hold content.
///
/// # Examples
///
/// ```
/// use campaign_composer::composer::messages::greeting;
/// use campaign_composer::composer::{Draft, Section};
///
/// let draft = Draft::new(Section::Store, "Order shipped");
/// let text = greeting(&draft);
/// assert!(text.contains("store transaction email"));
/// assert!(text.contains("Write a subject line"));
/// ```
pub fn greeting(draft: &Draft) -> String {
    let label = if draft.label.trim().is_empty() {
        "this email"
    } else {
        draft.label.trim()
    };

    let mut text = String::from("Hi! I'm your email assistant. ");
    text.push_str(&match draft.section {
        Section::Store => format!(
            "I see you're working on a **store transaction email** for {}. ",
            label
        ),
        Section::Community => format!(
            "I see you're editing a **community notification** for {}. ",
            label
        ),
        Section::Rewards => format!(
            "I see you're customizing a **rewards/points email** for {}. ",
            label
        ),
        Section::Timed => format!(
            "I see you're creating a **timed/sequence email** for {}. ",
            label
        ),
        Section::Proposals => format!("I see you're drafting a **proposal email** for {}. ", label),
        Section::General => format!("I'm here to help you with **{}**. ", label),
    });

    let has_subject = !draft.subject.trim().is_empty();
    let has_body = !draft.html.trim().is_empty();

    let mut suggestions = Vec::new();
    if !has_subject {
        suggestions.push("• **Write a subject line**");
    }
    if !has_body {
        suggestions.push("• **Generate email body copy**");
    } else {
        suggestions.push("• **Improve existing copy**");
        suggestions.push("• **Add visual elements**");
    }
    if has_subject && has_body {
        text.push_str("Looks like you've got a good start! ");
        suggestions.push("• **Polish and refine**");
        suggestions.push("• **Apply a theme**");
    }

    text.push_str("\n\nI can help you:\n");
    text.push_str(&suggestions.join("\n"));
    text
}

/// Opening question of the guided workflow
pub fn campaign_question() -> &'static str {
    "**Let's craft a campaign that gets opened, not archived.** 🚀\n\n\
     To start, what is the **primary goal** of this email?"
}

/// Reply after a campaign type is chosen
pub fn audience_question(campaign: CampaignType) -> String {
    format!(
        "**{}** - got it! Who is receiving this email?",
        campaign.label()
    )
}

/// Placeholder shown while subject lines are generated
pub fn generating_subjects() -> &'static str {
    "Crafting 3 subject lines..."
}

/// Placeholder shown while a revision is generated
pub fn generating_revision(modifier: Modifier) -> String {
    format!("Revising subject lines ({})...", modifier.label())
}

/// Intro to the subject candidates
pub fn subject_options_intro() -> &'static str {
    "Here are 3 subject line options using different psychological hooks. Which one resonates?"
}

/// Reply after a candidate is locked in
pub fn subject_locked() -> &'static str {
    "**Locked in!** ✅\n\n\
     Great choice. Your subject line is now set.\n\n\
     Now for the content. I'll write persuasive copy for you. Just list the **3-4 key points** you need to mention.\n\n\
     _For example: \"Ends Friday,\" \"Free shipping over $50,\" \"New colors available\"_"
}

/// Reply after a custom subject is accepted
pub fn custom_subject_accepted() -> &'static str {
    "**Love it!** ✨\n\n\
     Using your custom subject line. Now for the content.\n\n\
     Just list the **3-4 key points** you need to mention.\n\n\
     _For example: \"Ends Friday,\" \"Free shipping over $50,\" \"New colors available\"_"
}

/// Placeholder shown while body copy is generated
pub fn generating_body() -> &'static str {
    "Writing your email copy..."
}

/// Reply after the body is written
pub fn body_ready() -> &'static str {
    "**Draft is ready!** 📝\n\n\
     I've added the copy to the body. You can edit it directly.\n\n\
     **What do you think?** We can move on to visuals."
}

/// Reply when the image sub-flow starts
pub fn image_prompt_request() -> &'static str {
    "**Let's create something unique.** 🎨\n\n\
     Describe the image you want, or type 'suggest' and I'll come up with a prompt based on your email copy."
}

/// Placeholder shown while an image is generated
pub fn generating_image() -> &'static str {
    "Generating your image..."
}

/// Reply presenting a generated image
pub fn image_concept(prompt: &str, placeholder: bool) -> String {
    let mut text = format!(
        "**Here is a concept for you.** 🖼️\n\nI've generated an image based on: \"{}\"\n\n",
        prompt
    );
    if placeholder {
        text.push_str("_(Note: This is a placeholder image for demonstration)_\n\n");
    }
    text.push_str("Should we **Use This** or **Try Again**?");
    text
}

/// Reply on entering the final review
pub fn final_review() -> &'static str {
    "**Final Review Time!** 🚀\n\n\
     Your email is taking shape.\n\n\
     **Want to adjust the style?** Pick a theme below, or just hit Send if you're ready."
}

/// Placeholder shown while a theme is applied
pub fn applying_theme(theme: ThemeStyle) -> String {
    format!("Applying the {} theme...", theme.label())
}

/// Reply after a theme is applied
pub fn theme_applied() -> &'static str {
    "**Theme Applied!** 🎨\n\nHow does it look? You can try another theme or proceed to send."
}

/// Placeholder shown while a free-chat reply is generated
pub fn thinking() -> &'static str {
    "Thinking..."
}

/// Reply after an offered subject is applied
pub fn subject_applied(subject: &str) -> String {
    format!("Subject updated to \"{}\".", subject)
}

/// Reply after offered content is applied to the body
pub fn body_applied() -> &'static str {
    "Body updated."
}

/// Reply after an offered design is applied
pub fn design_applied() -> &'static str {
    "Design applied! Review it and send when you're ready."
}

/// Reply after an image is placed in the body
pub fn image_inserted() -> &'static str {
    "Image added to the email body."
}

/// Prompt used when the user types `suggest` in the image step
pub fn suggested_image_prompt(subject: Option<&str>, campaign: Option<CampaignType>) -> String {
    match subject.map(str::trim).filter(|s| !s.is_empty()) {
        Some(subject) => format!(
            "A clean, eye-catching email header illustration for: {}",
            subject
        ),
        None => format!(
            "A clean, eye-catching email header illustration for a {}",
            campaign.unwrap_or(CampaignType::Other).prompt_label()
        ),
    }
}
