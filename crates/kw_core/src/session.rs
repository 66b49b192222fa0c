use crate::seo;
use crate::types::OptimizeResponse;

/// Client-side editing state for one piece of content.
///
/// Mirrors what the editor shows: the pasted text, the optimised text the
/// user keeps editing, the suggested keywords and the two scores. The
/// current score is recomputed every time the text or keywords change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorSession {
    content: String,
    optimized_content: String,
    keywords: Vec<String>,
    seo_score: u8,
    target_seo_score: u8,
}

impl EditorSession {
    pub fn new(content: impl Into<String>) -> Self {
        let mut session = Self {
            content: content.into(),
            ..Default::default()
        };
        session.recompute_score();
        session
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn optimized_content(&self) -> &str {
        &self.optimized_content
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn seo_score(&self) -> u8 {
        self.seo_score
    }

    pub fn target_seo_score(&self) -> u8 {
        self.target_seo_score
    }

    pub fn set_optimized_content(&mut self, text: impl Into<String>) {
        self.optimized_content = text.into();
        self.recompute_score();
    }

    pub fn set_keywords(&mut self, keywords: Vec<String>) {
        self.keywords = keywords;
        self.recompute_score();
    }

    /// Replace state with an optimisation result. The scores reported by the
    /// service are taken as-is, then the local score takes over as soon as
    /// anything changes.
    pub fn apply_response(&mut self, response: OptimizeResponse) {
        self.optimized_content = response.optimized_text;
        self.keywords = response.highlighted_keywords;
        self.seo_score = seo::clamp_score(response.current_seo_score);
        self.target_seo_score = seo::clamp_score(response.target_seo_score);
    }

    /// Text the score is computed on: the optimised text once there is one.
    pub fn scored_text(&self) -> &str {
        if self.optimized_content.is_empty() {
            &self.content
        } else {
            &self.optimized_content
        }
    }

    pub fn recompute_score(&mut self) -> u8 {
        self.seo_score = seo::seo_score(self.scored_text(), &self.keywords);
        self.seo_score
    }

    /// Insert a suggested keyword into the optimised text and rescore.
    pub fn add_keyword(&mut self, keyword: &str) {
        self.optimized_content = seo::insert_keyword(&self.optimized_content, keyword);
        self.recompute_score();
    }

    /// Optimised text with every keyword wrapped in `<mark>`.
    pub fn highlighted(&self) -> String {
        seo::highlight(&self.optimized_content, &self.keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_scores_content() {
        let session = EditorSession::new("the cat sat on the cat mat");
        assert_eq!(session.seo_score(), 0);
        assert_eq!(session.scored_text(), "the cat sat on the cat mat");
    }

    #[test]
    fn test_apply_response_replaces_state() {
        let mut session = EditorSession::new("original text");
        session.apply_response(OptimizeResponse {
            optimized_text: "the cat sat on the cat mat".into(),
            highlighted_keywords: vec!["**cat**".into()],
            current_seo_score: 41.6,
            target_seo_score: 3.4,
        });
        assert_eq!(session.optimized_content(), "the cat sat on the cat mat");
        assert_eq!(session.seo_score(), 42);
        assert_eq!(session.target_seo_score(), 3);

        assert_eq!(session.recompute_score(), 57);
        assert_eq!(
            session.highlighted(),
            "the <mark>cat</mark> sat on the <mark>cat</mark> mat"
        );
    }

    #[test]
    fn test_empty_response_defaults() {
        let mut session = EditorSession::new("kept");
        session.apply_response(OptimizeResponse::default());
        assert_eq!(session.optimized_content(), "");
        assert!(session.keywords().is_empty());
        assert_eq!(session.seo_score(), 0);
        assert_eq!(session.scored_text(), "kept");
    }

    #[test]
    fn test_add_keyword_rescores() {
        let mut session = EditorSession::new("");
        session.set_keywords(vec!["degree".into()]);
        session.set_optimized_content("Study with us. Apply today.");
        assert_eq!(session.seo_score(), 0);

        session.add_keyword("degree");
        assert_eq!(session.optimized_content(), "Study with us. degree Apply today.");
        assert_eq!(session.seo_score(), 33);

        session.add_keyword("degree");
        assert_eq!(session.optimized_content(), "Study with us. degree Apply today.");
    }
}
