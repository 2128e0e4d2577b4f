use crate::models::Suggestion;

pub const SUGGESTIONS: &[Suggestion] = &[
    Suggestion {
        name: "Read one page",
        description: "Open the book and read a single page.",
        tags: &["mind", "learning"],
    },
    Suggestion {
        name: "One push-up",
        description: "Drop down and do one push-up.",
        tags: &["body", "fitness"],
    },
    Suggestion {
        name: "Floss one tooth",
        description: "Floss just one tooth, more if you feel like it.",
        tags: &["health"],
    },
    Suggestion {
        name: "Meditate one minute",
        description: "Sit still and breathe for sixty seconds.",
        tags: &["mind", "calm"],
    },
    Suggestion {
        name: "Drink a glass of water",
        description: "One full glass right after waking up.",
        tags: &["health", "morning"],
    },
    Suggestion {
        name: "Write one sentence",
        description: "Put one sentence in the journal.",
        tags: &["writing", "reflection"],
    },
    Suggestion {
        name: "Tidy one item",
        description: "Put a single thing back where it belongs.",
        tags: &["home"],
    },
    Suggestion {
        name: "Walk for five minutes",
        description: "Step outside and walk around the block.",
        tags: &["body", "outdoors"],
    },
];

pub fn suggestion(index: usize) -> Option<&'static Suggestion> {
    SUGGESTIONS.get(index)
}

impl Suggestion {
    /// Tags joined the way the creation form expects them.
    pub fn tags_field(&self) -> String {
        self.tags.join(", ")
    }
}
