use crate::core::i18n::Language;
use crate::core::state::AppState;
use anyhow::Result;

/// Sets `language`, or toggles when none is given.
pub async fn run(state: &AppState, language: Option<Language>) -> Result<()> {
    let language = match language {
        Some(language) => {
            state.set_language(language).await;
            language
        }
        None => state.switch_language().await,
    };
    println!("{}", language.labels().language_changed);
    Ok(())
}
