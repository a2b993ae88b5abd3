//! Canned responder behind the demo chat and the Telegram webhook.

const GREETINGS: &[&str] = &["привет", "здравствуй", "hello", "hi", "hey", "/start"];
const WEATHER_WORDS: &[&str] = &["погод", "weather", "прогноз", "forecast", "температур"];

/// Produce a reply for one chat message. Deterministic; no upstream calls.
pub fn reply(message: &str) -> String {
    let text = message.trim();
    if text.is_empty() {
        return "Напишите что-нибудь, и я отвечу.".to_string();
    }

    let lower = text.to_lowercase();
    let has_word = |word: &str| {
        lower
            .split(|c: char| !c.is_alphanumeric() && c != '/')
            .any(|token| token == word)
    };

    if GREETINGS.iter().any(|w| has_word(*w)) {
        "Привет! Я демо-бот погодного приложения. Спросите меня о погоде.".to_string()
    } else if WEATHER_WORDS.iter().any(|w| lower.contains(w)) {
        "Актуальная погода и прогноз на 5 дней доступны на вкладке «Погода».".to_string()
    } else {
        format!("Вы написали: {text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_message_prompts_for_input() {
        assert!(reply("   ").starts_with("Напишите"));
    }

    #[test]
    fn greetings_are_recognised() {
        assert!(reply("Привет!").starts_with("Привет!"));
        assert!(reply("/start").starts_with("Привет!"));
        assert!(reply("hi there").starts_with("Привет!"));
        // Substrings of longer words are not greetings.
        assert!(!reply("this").starts_with("Привет!"));
    }

    #[test]
    fn weather_questions_point_to_weather_tab() {
        assert!(reply("Какая сегодня погода?").contains("«Погода»"));
        assert!(reply("weather in Paris").contains("«Погода»"));
    }

    #[test]
    fn other_messages_are_echoed() {
        assert_eq!(reply("  как дела  "), "Вы написали: как дела");
    }
}
