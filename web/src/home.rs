use std::rc::Rc;

use julkvall_core::{GameType, puzzle_count};
use yew::prelude::*;

use crate::routes::Route;
use crate::services::Services;

#[derive(Properties, PartialEq)]
pub(crate) struct HomeProps {
    pub services: Rc<Services>,
    pub navigate: Callback<Route>,
}

#[function_component]
pub(crate) fn Home(props: &HomeProps) -> Html {
    let progress = &props.services.progress;
    let next_puzzle = progress.get(GameType::Puzzles).next_unlocked_level().min(puzzle_count());
    let solved_puzzles = progress.get(GameType::Puzzles).solved().len();
    let emojis_done = progress.get(GameType::Emojis).is_solved(1);

    let link = |route: Route| {
        let navigate = props.navigate.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            navigate.emit(route);
        })
    };

    html! {
        <main class="home">
            <h1>{"Julens Spelkväll"}</h1>
            <nav>
                <a href={Route::Puzzle(next_puzzle).path()} onclick={link(Route::Puzzle(next_puzzle))}>
                    <h2>{"🔥 Tändsticksproblem"}</h2>
                    <small>{format!("{} av {} lösta", solved_puzzles, puzzle_count())}</small>
                </a>
                <a href={Route::Emojis.path()} onclick={link(Route::Emojis)}>
                    <h2>{"🎶 Gissa Låten"}</h2>
                    if emojis_done {
                        <small>{"✔ Klarad"}</small>
                    }
                </a>
                <a href={Route::Forehead.path()} onclick={link(Route::Forehead)}>
                    <h2>{"📱 Pannband"}</h2>
                </a>
            </nav>
            <footer>
                <a href={Route::Leaderboard.path()} onclick={link(Route::Leaderboard)}>
                    {"Värdvy (Live Leaderboard)"}
                </a>
                {" · "}
                <a href={Route::EmojiSolutions.path()} onclick={link(Route::EmojiSolutions)}>
                    {"Facit Julquiz"}
                </a>
            </footer>
        </main>
    }
}
