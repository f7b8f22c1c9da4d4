/// Canned reply used when no upstream is configured or every upstream attempt failed.
pub fn mock_reply(text: &str, language: &str) -> String {
    match language.to_lowercase().as_str() {
        "en" => format!(
            "I received your message: \"{}\". This is a mock AI response in English.",
            text
        ),
        "es" => format!(
            "Recibí tu mensaje: \"{}\". Esta es una respuesta de IA simulada en español.",
            text
        ),
        "fr" => format!(
            "J'ai reçu votre message: \"{}\". Ceci est une réponse IA simulée en français.",
            text
        ),
        "de" => format!(
            "Ich habe Ihre Nachricht erhalten: \"{}\". Dies ist eine simulierte KI-Antwort auf Deutsch.",
            text
        ),
        "it" => format!(
            "Ho ricevuto il tuo messaggio: \"{}\". Questa è una risposta AI simulata in italiano.",
            text
        ),
        "pt" => format!(
            "Recebi sua mensagem: \"{}\". Esta é uma resposta de IA simulada em português.",
            text
        ),
        "ja" => format!(
            "メッセージを受け取りました: \"{}\". これは日本語のモックAI応答です。",
            text
        ),
        "zh" => format!("我收到了您的消息: \"{}\". 这是中文的模拟AI回复。", text),
        _ => format!(
            "I received your message: \"{}\". This is a mock AI response. (Language: {})",
            text, language
        ),
    }
}
