//! Prompt templates for every inference call the pipeline makes.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever template wording changes,
//! so stored reports can be traced back to the prompts that produced them.
//! The extractors in `crate::extract` depend on the response formats requested
//! here; change both together.

use crate::extract::truncate_chars;

/// Prompt version. Bump on any template change.
pub const PROMPT_VERSION: &str = "5.0.0";

/// Characters of essay text shown to the classifier.
pub const CLASSIFY_EXCERPT_CHARS: usize = 800;
/// Characters of essay text shown to the rubric scorer.
pub const SCORE_EXCERPT_CHARS: usize = 1000;
/// Characters of essay text previewed per candidate in the cross-zone prompt.
pub const CANDIDATE_PREVIEW_CHARS: usize = 400;
/// Characters of the strengths summary shown per essay in the zone judge prompt.
pub const ZONE_SUMMARY_STRENGTHS_CHARS: usize = 50;

const CLASSIFY_PREAMBLE: &str = "\
You are an expert essay classifier. Read this essay carefully and determine if it is \
SPECIFICALLY about Independence Day.

INDEPENDENCE DAY topics include:
- August 15th celebrations
- Indian freedom struggle
- Freedom fighters (Gandhi, Nehru, etc.)
- Flag hoisting ceremonies
- Patriotic themes related to India's independence

NON-INDEPENDENCE DAY topics include:
- Sports, technology, education, environment
- Career goals, social media, books
- General topics not related to Indian independence";

const CLASSIFY_FORMAT: &str = "\
IMPORTANT: Respond in EXACTLY this format:
TOPIC: [Independence Day] OR [Other Topic]
CLASSIFICATION: [YES] OR [NO]
SCORE: [1.0 to 5.0]

Your response:";

/// Topic classification prompt over the first `CLASSIFY_EXCERPT_CHARS` characters.
pub fn classification_prompt(essay: &str) -> String {
    format!(
        "{CLASSIFY_PREAMBLE}\n\nEssay to classify:\n{}\n\n{CLASSIFY_FORMAT}",
        truncate_chars(essay, CLASSIFY_EXCERPT_CHARS)
    )
}

/// Five-dimension rubric prompt over the first `SCORE_EXCERPT_CHARS` characters.
pub fn rubric_prompt(essay_name: &str, essay: &str) -> String {
    format!(
        "Rate this Independence Day essay quickly on a 1-10 scale:

Essay: {essay_name}
Essay text: {}

Rate these 5 aspects (1-10):
Relevance: How relevant to Independence Day?
Content: How good is the content?
Writing: How well written?
Original: How original/unique?
Impact: How inspiring/emotional?

Answer ONLY in this format:
Relevance: 8
Content: 7
Writing: 9
Original: 6
Impact: 8
Strengths: [Brief list]
Topics: [Independence Day topics covered]",
        truncate_chars(essay, SCORE_EXCERPT_CHARS)
    )
}

/// Within-zone comparative ranking prompt. `summary` holds one line per essay.
pub fn zone_judge_prompt(essay_count: usize, summary: &str) -> String {
    format!(
        "Rank these {essay_count} Independence Day essays from best to worst:

{summary}

Give final ranking in this format:
1st: [filename] - [9.0-10.0] - Why it's best
2nd: [filename] - [8.0-8.9] - Why it's second
3rd: [filename] - [7.0-7.9] - Why it's third
[continue for all essays]

Keep explanations brief (1 sentence each)."
    )
}

/// Cross-zone championship prompt. `candidates` holds the per-zone candidate blocks.
pub fn championship_prompt(candidates: &str) -> String {
    format!(
        "You are the GRAND JUDGE for a multi-zone Independence Day essay competition.

You must rank ALL the top essays from different zones against each other to find the ultimate winner.
{candidates}
Your task:
1. Rank ALL essays from BEST to WORST across all zones
2. Give each essay a final competition score (1-10)
3. Explain why the winner deserves the top position
4. Compare performance between zones
5. Identify which zone produced the highest quality essays

Respond in this EXACT format:

GRAND CHAMPIONSHIP RANKING

1st Place: [Filename] from [Zone] - Final Score: [9.0-10.0]
   Champion Qualities: [Why this essay wins the entire competition]

2nd Place: [Filename] from [Zone] - Final Score: [8.5-9.0]
   Excellence: [What makes this essay exceptional]

3rd Place: [Filename] from [Zone] - Final Score: [8.0-8.5]
   Strengths: [Why this essay deserves bronze]

[Continue for all essays...]

ZONE PERFORMANCE ANALYSIS
[Zone name] Performance: [Overall assessment]
[Continue for all zones...]

COMPETITION INSIGHTS
Best Performing Zone: [Zone name and why]
Overall Competition Quality: [Assessment of all essays]
Key Differentiators: [What separated top essays from others]

GRAND CHAMPION CITATION:
[Special recognition for the ultimate winner with detailed reasoning]
"
    )
}
