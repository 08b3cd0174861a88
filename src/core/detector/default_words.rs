// Built-in forbidden-word list, all lowercase. Repositories extend it
// with `extraWords` and carve exceptions with `exemptWords`.

pub(crate) const DEFAULT_WORDS: &[&str] = &[
    "arse",
    "arsehole",
    "ass",
    "asses",
    "asshole",
    "assholes",
    "bastard",
    "bastards",
    "bitch",
    "bitches",
    "bollocks",
    "bullshit",
    "clit",
    "cock",
    "cocks",
    "crap",
    "cunt",
    "cunts",
    "damn",
    "dick",
    "dickhead",
    "dildo",
    "douche",
    "dyke",
    "fag",
    "faggot",
    "fuck",
    "fucked",
    "fucker",
    "fuckers",
    "fucking",
    "fucks",
    "goddamn",
    "handjob",
    "jackass",
    "jizz",
    "motherfucker",
    "motherfuckers",
    "nigga",
    "nigger",
    "piss",
    "pissed",
    "prick",
    "pricks",
    "pussies",
    "pussy",
    "shit",
    "shits",
    "shitty",
    "slut",
    "sluts",
    "tit",
    "tits",
    "twat",
    "wank",
    "wanker",
    "whore",
    "whores",
];
