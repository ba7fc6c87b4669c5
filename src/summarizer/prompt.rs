use crate::models::Review;

/// Builds the model prompt from review texts joined by `separator`.
pub fn compose_prompt(reviews: &[Review], separator: char) -> String {
    let joined = reviews
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(&separator.to_string());

    format!(
        "Based on the following restaurant reviews, \
         where each review is separated by a '{sep}' character, \
         create a one-sentence summary of what people think of the restaurant.\n\n\
         Here are the reviews: {joined}",
        sep = separator,
        joined = joined
    )
}
