/*!
 * Fixed character and keyword sets used by the rhyme and dialogue rankers.
 */

/// Sentence-final mood particles dropped before measuring or rhyming a line
pub const SENTENCE_FILLERS: &[char] = &[
    '啊', '呢', '吗', '吧', '呀', '嘛', '哦', '哎', '嗯', '呐', '呵', '呦', '诶', '哈', '哟', '了',
];

/// Closing and sentence punctuation that makes a poor rhyme ending
pub const RHYME_PUNCTUATION: &[char] = &[
    '，', '。', '！', '？', '：', '；', '"', '（', '）', '【', '】', '《', '》', '、',
];

/// Markers of a question
pub const QUESTION_MARKERS: &[&str] = &["?", "？", "吗", "呢"];

/// Positive sentiment keywords
pub const POSITIVE_WORDS: &[&str] = &["好", "愿意", "可以", "是", "对", "喜欢", "爱", "高兴"];

/// Negative sentiment keywords
pub const NEGATIVE_WORDS: &[&str] = &["不", "没", "别", "莫", "拒绝", "难过", "恨", "讨厌"];

/// Turn-of-thought connectives
pub const TRANSITION_WORDS: &[&str] = &["但", "却", "然而", "只是", "不过", "反而"];

/// Imperative keywords
pub const COMMAND_WORDS: &[&str] = &["去", "来", "给我", "快", "立刻", "马上", "传"];

/// Exclamations of surprise
pub const SURPRISE_WORDS: &[&str] = &["啊", "哎呀", "天哪", "竟然", "居然", "怎么会"];

/// Replies that either obey or refuse an order
pub const COMPLIANCE_OR_REFUSAL_WORDS: &[&str] =
    &["是", "遵命", "好的", "立刻", "不", "不行", "恐怕", "不能"];

/// Drop a single trailing filler particle, if any.
pub fn strip_trailing_filler(text: &str) -> &str {
    match text.chars().next_back() {
        Some(last) if SENTENCE_FILLERS.contains(&last) => &text[..text.len() - last.len_utf8()],
        _ => text,
    }
}

/// Length in characters, which is what every length rule counts.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The `n`-th character counted from the end (0 is the last one).
pub fn nth_last_char(text: &str, n: usize) -> Option<char> {
    text.chars().rev().nth(n)
}

/// Whether `text` contains any of the given keywords.
pub fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.contains(word))
}
