//! Built-in concerning-term list, grouped by category.
//! Deployments override it with `KEYWORD_LIST_PATH`.

pub(super) const DEFAULT_TERMS: &[(&str, &[&str])] = &[
    (
        "self-harm",
        &[
            "kill myself",
            "killing myself",
            "want to die",
            "wanna die",
            "end my life",
            "cut myself",
            "cutting myself",
            "hurt myself",
            "suicide",
            "suicidal",
            "no reason to live",
        ],
    ),
    (
        "bullying",
        &[
            "loser",
            "nobody likes you",
            "everyone hates you",
            "kill yourself",
            "kys",
            "you are worthless",
            "ugly freak",
        ],
    ),
    (
        "sexual-content",
        &[
            "send nudes",
            "nudes",
            "naked pic",
            "naked pics",
            "take off your clothes",
            "sext",
            "sexting",
        ],
    ),
    (
        "grooming",
        &[
            "our little secret",
            "dont tell your parents",
            "don't tell your parents",
            "delete this chat",
            "meet me alone",
            "how old are you really",
        ],
    ),
    (
        "violence",
        &["bring a gun", "shoot up", "beat you up", "stab you"],
    ),
    (
        "drugs",
        &["weed", "vape", "pills", "get high", "cocaine"],
    ),
];
