//! Scripted replies for the voice assistant.

struct Topic {
    keywords: &'static [&'static str],
    reply: &'static str,
}

/// Checked in order; the first topic with a keyword contained in the message wins.
const TOPICS: &[Topic] = &[
    Topic {
        keywords: &["bin", "garbage", "waste", "trash"],
        reply: "I can help you find nearby waste bins! The map shows all available bins in your area with their current status. Green bins are available, yellow bins are nearly full, and red bins need emptying.",
    },
    Topic {
        keywords: &["recycle", "recycling"],
        reply: "For recycling, look for blue or green bins marked as recycling bins. Make sure to separate your materials properly - paper, plastic, glass, and metal should go in designated recycling bins.",
    },
    Topic {
        keywords: &["location", "where", "find", "nearest"],
        reply: "You can use the search function to find specific bins, or tap the location button to center the map on your current position. I can help you navigate to the nearest available bin.",
    },
    Topic {
        keywords: &["scan", "detect", "identify"],
        reply: "Use the scan feature to identify waste items! Just take a photo and I'll help you determine the best disposal method and find the right type of bin for each item.",
    },
    Topic {
        keywords: &["hello", "hi", "hey"],
        reply: "Hello! I'm your Smart EcoBin assistant powered by ElevenLabs AI. I can help you find nearby bins, provide recycling information, and guide you to proper waste disposal locations. How can I assist you today?",
    },
    Topic {
        keywords: &["help"],
        reply: "I'm here to help with waste management! You can ask me about finding bins, recycling guidelines, waste disposal procedures, or scanning items. Just speak naturally and I'll do my best to assist you.",
    },
    Topic {
        keywords: &["smart", "ecobin"],
        reply: "Smart EcoBin is an intelligent waste management system that helps you locate and manage waste disposal efficiently. I'm your AI assistant to guide you through the process and make recycling easier!",
    },
    Topic {
        keywords: &["analytics", "stats", "score"],
        reply: "Check your analytics dashboard to see your recycling score, environmental impact, and achievements! You can track how much CO2 you've saved and see your progress over time.",
    },
    Topic {
        keywords: &["feedback", "suggest", "improve"],
        reply: "I'd love to hear your feedback! Use the feedback section to share suggestions, report issues, or tell us what you love about Smart EcoBin. Your input helps us improve the app.",
    },
];

const FALLBACK_REPLY: &str = "I'm your Smart EcoBin AI assistant. I can help you find bins, provide recycling information, guide you with waste disposal, and answer questions about the app. Could you please be more specific about what you need help with?";

/// Keywords match as plain substrings of the lowercased message, so "this" counts as a greeting.
pub fn reply_to(message: &str) -> &'static str {
    let message = message.to_lowercase();

    TOPICS
        .iter()
        .find(|topic| topic.keywords.iter().any(|kw| message.contains(kw)))
        .map_or(FALLBACK_REPLY, |topic| topic.reply)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_topic_order_wins() {
        // "recycling bin" hits the bin topic before the recycling one
        assert_eq!(reply_to("Where is the nearest recycling bin?"), TOPICS[0].reply);
        assert_eq!(reply_to("How do I RECYCLE glass?"), TOPICS[1].reply);
        assert_eq!(reply_to("nearest one please"), TOPICS[2].reply);
    }

    #[test]
    fn test_greeting_and_help() {
        assert!(reply_to("Hey there").starts_with("Hello!"));
        assert!(reply_to("help me").starts_with("I'm here to help"));
    }

    #[test]
    fn test_substring_matching() {
        assert_eq!(reply_to("this"), TOPICS[4].reply);
        assert_eq!(reply_to("what's my score"), TOPICS[7].reply);
    }

    #[test]
    fn test_fallback() {
        assert_eq!(reply_to("good morning"), FALLBACK_REPLY);
        assert_eq!(reply_to(""), FALLBACK_REPLY);
    }
}
