//! Title language identification.
//!
//! Titles are short, which trigram models handle poorly, so Latin-script text
//! is first scored against small lists of very frequent words. Text that
//! scores nothing, or uses another script, goes to `whatlang`.

use whatlang::Script;

pub const DEFAULT_LANGUAGE: &str = "en";

const FREQUENT_WORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "of", "to", "in", "is", "you", "that", "it", "for", "on", "with",
            "this", "my", "i", "we", "how", "what", "why", "who", "your", "are", "was",
            "have", "from", "at", "be", "every", "last", "day", "days", "first", "world",
            "hello", "win", "challenge", "people", "ever", "hours", "vs",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "de", "des", "du", "et", "un", "une", "est", "pour", "dans",
            "sur", "avec", "pas", "qui", "que", "ce", "cette", "je", "nous", "vous", "il",
            "elle", "mon", "bonjour", "monde", "jour", "jours", "contre", "tout", "au", "aux",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "las", "de", "del", "y", "en", "un", "una", "es", "por",
            "para", "con", "que", "no", "mi", "su", "hola", "mundo", "contra", "día", "días",
            "cómo", "gané",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "ich", "nicht", "ein", "eine", "mit", "für",
            "auf", "den", "dem", "zu", "von", "hallo", "welt", "tag", "tage", "gegen",
        ],
    ),
    (
        "it",
        &[
            "il", "lo", "gli", "la", "le", "di", "e", "che", "un", "una", "per", "con", "non",
            "sono", "ciao", "mondo", "giorno", "della", "del",
        ],
    ),
    (
        "pt",
        &[
            "o", "os", "as", "de", "do", "da", "dos", "das", "e", "um", "uma", "para", "com",
            "não", "é", "olá", "mundo", "dia", "eu", "você",
        ],
    ),
    (
        "nl",
        &[
            "de", "het", "een", "en", "van", "ik", "je", "niet", "op", "met", "voor", "is",
            "hallo", "wereld", "dag", "tegen",
        ],
    ),
];

/// Classifies `text` into a two-letter ISO 639-1 code. Never fails: text with
/// nothing recognizable is reported as [`DEFAULT_LANGUAGE`].
pub fn detect_language(text: &str) -> &'static str {
    let text = text.trim();
    if text.is_empty() {
        return DEFAULT_LANGUAGE;
    }

    let trigram_guess = whatlang::detect(text).map(|info| iso639_1(info.lang().code()));

    if whatlang::detect_script(text) == Some(Script::Latin) {
        let candidates = best_word_matches(text);
        match candidates.as_slice() {
            [] => {}
            [only] => return *only,
            tied => {
                return trigram_guess
                    .filter(|guess| tied.contains(guess))
                    .unwrap_or(tied[0]);
            }
        }
    }

    trigram_guess.unwrap_or(DEFAULT_LANGUAGE)
}

/// Languages with the highest frequent-word score, in table order.
fn best_word_matches(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    let scores: Vec<(&'static str, usize)> = FREQUENT_WORDS
        .iter()
        .map(|(lang, list)| (*lang, words.iter().filter(|w| list.contains(w)).count()))
        .collect();

    let best = scores.iter().map(|(_, score)| *score).max().unwrap_or(0);
    if best == 0 {
        return Vec::new();
    }
    scores
        .into_iter()
        .filter(|(_, score)| *score == best)
        .map(|(lang, _)| lang)
        .collect()
}

fn iso639_1(code: &str) -> &'static str {
    match code {
        "eng" => "en",
        "fra" => "fr",
        "spa" => "es",
        "deu" => "de",
        "ita" => "it",
        "por" => "pt",
        "nld" => "nl",
        "rus" => "ru",
        "ukr" => "uk",
        "bel" => "be",
        "bul" => "bg",
        "mkd" => "mk",
        "srp" => "sr",
        "hrv" => "hr",
        "slv" => "sl",
        "slk" => "sk",
        "ces" => "cs",
        "pol" => "pl",
        "ron" => "ro",
        "hun" => "hu",
        "fin" => "fi",
        "est" => "et",
        "lav" => "lv",
        "lit" => "lt",
        "swe" => "sv",
        "dan" => "da",
        "nob" => "nb",
        "ell" => "el",
        "tur" => "tr",
        "aze" => "az",
        "uzb" => "uz",
        "tuk" => "tk",
        "kat" => "ka",
        "hye" => "hy",
        "heb" => "he",
        "yid" => "yi",
        "ara" => "ar",
        "pes" => "fa",
        "urd" => "ur",
        "hin" => "hi",
        "mar" => "mr",
        "nep" => "ne",
        "ben" => "bn",
        "pan" => "pa",
        "guj" => "gu",
        "ori" => "or",
        "tam" => "ta",
        "tel" => "te",
        "kan" => "kn",
        "mal" => "ml",
        "sin" => "si",
        "tha" => "th",
        "khm" => "km",
        "mya" => "my",
        "vie" => "vi",
        "ind" => "id",
        "jav" => "jv",
        "tgl" => "tl",
        "cmn" => "zh",
        "jpn" => "ja",
        "kor" => "ko",
        "amh" => "am",
        "afr" => "af",
        "zul" => "zu",
        "sna" => "sn",
        "aka" => "ak",
        "cat" => "ca",
        "lat" => "la",
        "epo" => "eo",
        _ => DEFAULT_LANGUAGE,
    }
}
