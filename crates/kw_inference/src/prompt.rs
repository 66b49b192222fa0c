use kw_core::seo::clean_keywords;

pub const SYSTEM_PROMPT: &str =
    "You are an SEO expert optimizing text by integrating keywords naturally and contextually.";

/// User prompt asking for `keywords` to be worked into `text`.
pub fn rewrite_prompt<S: AsRef<str>>(text: &str, keywords: &[S]) -> String {
    let keywords = clean_keywords(keywords)
        .into_iter()
        .map(|k| k.trim().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Revise the following text by subtly and naturally integrating these keywords. \
         Maintain readability, avoid keyword stuffing, and ensure each keyword fits logically within sentences.\n\n\
         Original Text:\n{text}\n\n\
         Keywords to Integrate: {keywords}\n\n\
         Guidelines:\n\
         - Use keywords only where they fit naturally within the text.\n\
         - Ensure each keyword is contextually relevant to its sentence.\n\
         - Do not add symbols around keywords; keep them simple.\n\
         - Maintain a professional tone.\n"
    )
}
