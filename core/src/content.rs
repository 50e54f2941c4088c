//! Static game content.

use crate::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchstickPuzzle {
    pub id: LevelId,
    pub title: &'static str,
    pub problem: &'static str,
    pub problem_image: &'static str,
    pub solution_image: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmojiRiddle {
    pub id: LevelId,
    pub emojis: &'static str,
    pub answer: &'static str,
    pub description: Option<&'static str>,
}

/// Matchstick puzzles, unlocked in order.
pub static PUZZLES: &[MatchstickPuzzle] = &[
    MatchstickPuzzle {
        id: 1,
        title: "Staplade Trianglar",
        problem: "Det finns 4 lika stora trianglar. Flytta 4 tändstickor för att skapa 2 lika stora trianglar.",
        problem_image: "/puzzles/p1_problem.png",
        solution_image: "/puzzles/p1_solution.png",
    },
    MatchstickPuzzle {
        id: 2,
        title: "Sex till Fem Trianglar",
        problem: "Det finns 6 lika stora trianglar. FLYTTA 2 tändstickor för att forma 5 lika stora trianglar.",
        problem_image: "/puzzles/p2_problem.png",
        solution_image: "/puzzles/p2_solution.png",
    },
    MatchstickPuzzle {
        id: 3,
        title: "Kors till Kvadrater",
        problem: "Flytta 4 tändstickor för att ändra korset till 4 LIKA STORA kvadrater.",
        problem_image: "/puzzles/p3_problem.png",
        solution_image: "/puzzles/p3_solution.png",
    },
    MatchstickPuzzle {
        id: 4,
        title: "4 till 3 kvadrater",
        problem: "Ta bort 3 och flytta 2 tändstickor för att forma 3 lika stora kvadrater.",
        problem_image: "/puzzles/p4_problem.png",
        solution_image: "/puzzles/p4_solution.png",
    },
    MatchstickPuzzle {
        id: 5,
        title: "5 till 4 kvadrater",
        problem: "Flytta 2 tändstickor för att forma 4 lika stora kvadrater.",
        problem_image: "/puzzles/p5_problem.png",
        solution_image: "/puzzles/p5_solution.png",
    },
];

pub static EMOJI_QUIZ: &[EmojiRiddle] = &[
    EmojiRiddle {
        id: 1,
        emojis: "🦌🔴👃",
        answer: "Sång: Rudolf med röda mulen",
        description: Some("Ren + Röd + Näsa"),
    },
    EmojiRiddle {
        id: 2,
        emojis: "🏠😱✈️",
        answer: "Film: Ensam Hemma / Home Alone",
        description: Some("Hus + Skrik + Flygplan/Resa"),
    },
    EmojiRiddle {
        id: 3,
        emojis: "💔🩹📅",
        answer: "Sång: Last Christmas, Wham!",
        description: Some("Hjärtekross + Plåster/Laga + Kalender"),
    },
    EmojiRiddle {
        id: 4,
        emojis: "🚫💧👹",
        answer: "Film: Gremlins",
        description: Some("Förbud + Vatten + Monster, de berömda reglerna"),
    },
    EmojiRiddle {
        id: 5,
        emojis: "🦆📺🎄",
        answer: "TV/Tradition: Kalle Anka och hans vänner önskar God Jul",
        description: Some("Anka + TV + Gran"),
    },
    EmojiRiddle {
        id: 6,
        emojis: "🎁👉👤",
        answer: "Sång: All I Want for Christmas is You, Mariah Carey",
        description: Some("Paket + Pekar + Du/Person"),
    },
    EmojiRiddle {
        id: 7,
        emojis: "🚂❄️🎫",
        answer: "Film: Polarexpressen / The Polar Express",
        description: Some("Tåg + Snö + Biljett"),
    },
    EmojiRiddle {
        id: 8,
        emojis: "👀🤱🎅",
        answer: "Sång: Jag såg mamma kyssa tomten",
        description: Some("Ögon/Såg + Mamma + Tomte"),
    },
    EmojiRiddle {
        id: 9,
        emojis: "🕯️🕯️✨",
        answer: "Sång: Nu tändas tusen juleljus",
        description: Some("Ljus + Ljus + Gnistra/Skina"),
    },
    EmojiRiddle {
        id: 10,
        emojis: "🌑👣👸",
        answer: "Sång: Luciasången / Natten går tunga fjät",
        description: Some("Mörker/Natt + Fotspår + Lucia/Krona"),
    },
];

/// Served by the forehead game when the remote word list is empty or unreachable.
pub static FALLBACK_WORDS: &[&str] = &[
    "Tomte",
    "Julgran",
    "Pepparkaka",
    "Glögg",
    "Lussekatt",
    "Skinka",
    "Julklapp",
    "Snögubbe",
    "Ren",
    "Kalle Anka",
    "Lucia",
    "Risgrynsgröt",
    "Mandel",
    "Knäck",
    "Julbord",
    "Sill",
    "Janssons frestelse",
    "Köttbullar",
    "Adventsljus",
    "Julstjärna",
    "Halmbock",
    "Pulka",
    "Skridskor",
    "Vante",
    "Mistel",
    "Snöflinga",
    "Julafton",
    "Tomteluva",
    "Pepparkakshus",
    "Saffran",
    "Julmust",
    "Dopp i grytan",
    "Adventskalender",
    "Kransen",
    "Stjärngossar",
    "Nyårsraket",
    "Ljusstake",
    "Julkort",
    "Strumpa",
    "Släde",
    "Polkagris",
    "Ischoklad",
    "Snöboll",
    "Istapp",
    "Julsång",
    "Klappjakt",
    "Hyacint",
    "Grankvist",
    "Kanelbulle",
    "Rudolf",
];

pub fn puzzle(id: LevelId) -> Option<&'static MatchstickPuzzle> {
    PUZZLES.iter().find(|puzzle| puzzle.id == id)
}

pub fn puzzle_count() -> u32 {
    PUZZLES.len() as u32
}
