//! Prompt construction for letters and speeches

use crate::artifact::DraftRequest;
use crate::letters::types::LetterRequest;
use crate::speeches::types::SpeechRequest;
use std::fmt::Write;

/// A system + user message pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Build the prompt for `request`, asking for output in `language`
    pub fn for_request(request: &DraftRequest, language: &str) -> Self {
        match request {
            DraftRequest::Letter(letter) => letter_prompt(letter, language),
            DraftRequest::Speech(speech) => speech_prompt(speech, language),
        }
    }
}

fn letter_prompt(req: &LetterRequest, language: &str) -> Prompt {
    let system = format!(
        "You are an assistant specialised in writing professional letters in {language}. \
         You produce complete, well formatted letters."
    );

    let mut user = String::new();
    let _ = writeln!(user, "{}", req.tone.instruction());
    let _ = writeln!(user);
    let _ = writeln!(user, "Write a letter with the following information:");
    let _ = writeln!(user);
    let _ = writeln!(user, "**Sender:**");
    let _ = writeln!(user, "- Name: {}", req.sender_name);
    let _ = writeln!(user, "- Address: {}", req.sender_address);
    let _ = writeln!(user);
    let _ = writeln!(user, "**Recipient:**");
    let _ = writeln!(user, "- Name: {}", req.recipient_name);
    if let Some(address) = non_empty(&req.recipient_address) {
        let _ = writeln!(user, "- Address: {}", address);
    }
    let _ = writeln!(user);
    let _ = writeln!(user, "**Subject:** {}", req.subject);
    let _ = writeln!(user);
    let _ = writeln!(user, "**Context:** {}", req.context);
    if let Some(date) = non_empty(&req.effective_date) {
        let _ = writeln!(user);
        let _ = writeln!(user, "**Effective date:** {}", date);
    }
    let _ = writeln!(user);
    let _ = writeln!(user, "Specific instructions:");
    let _ = writeln!(user, "1. Format the letter properly with header, body and signature");
    let _ = writeln!(user, "2. Include today's date");
    let _ = writeln!(user, "3. Follow the letter-writing conventions of {language}");
    let _ = writeln!(user, "4. Adapt the content to the context provided");
    let _ = writeln!(user, "5. Make sure the letter is complete and ready to send");
    let _ = writeln!(user);
    let _ = write!(user, "Output only the letter itself, with no extra commentary.");

    Prompt { system, user }
}

fn speech_prompt(req: &SpeechRequest, language: &str) -> Prompt {
    let system = format!(
        "You are an assistant who writes warm, personal wedding speeches in {language}, \
         ready to be read aloud."
    );

    let mut user = String::new();
    let _ = writeln!(
        user,
        "Write a wedding speech given by {} ({} of the couple) for the wedding of {} and {}.",
        req.speaker_name, req.relationship, req.person1, req.person2
    );
    let _ = writeln!(user);
    let optional = [
        ("Style", &req.style),
        ("Qualities of the couple", &req.qualities),
        ("Anecdotes to include", &req.anecdotes),
        ("A memory worth mentioning", &req.memory),
        ("How they met", &req.how_they_met),
        ("Target duration", &req.duration),
    ];
    for (label, value) in optional {
        if let Some(value) = non_empty(value) {
            let _ = writeln!(user, "- {}: {}", label, value);
        }
    }
    let _ = writeln!(user);
    let _ = write!(
        user,
        "Output only the speech itself, with no title and no extra commentary."
    );

    Prompt { system, user }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
