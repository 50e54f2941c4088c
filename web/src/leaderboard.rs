use std::rc::Rc;

use futures_util::future::{AbortHandle, Abortable};
use julkvall_core::{
    CompletionRecord, GameType, LeaderboardView, PUZZLES, format_duration, rank_label,
};
use yew::prelude::*;

use crate::routes::Route;
use crate::services::Services;
use crate::utils::local_time;

/// A live leaderboard feed running on the event loop; dropping it stops the feed and releases its subscription.
struct Feed(AbortHandle);

impl Drop for Feed {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Updated(LeaderboardView),
    Refresh,
    Home,
}

#[derive(Properties, PartialEq)]
pub(crate) struct LeaderboardProps {
    pub services: Rc<Services>,
    pub navigate: Callback<Route>,
}

pub(crate) struct LeaderboardHost {
    puzzles: LeaderboardView,
    emojis: LeaderboardView,
    feeds: Vec<Feed>,
}

impl LeaderboardHost {
    fn open_feed(ctx: &Context<Self>, game: GameType) -> Feed {
        let services = ctx.props().services.clone();
        let link = ctx.link().clone();
        let (handle, registration) = AbortHandle::new_pair();
        let feed = async move {
            let mut live = services.leaderboards.open(game).await;
            link.send_message(Msg::Updated(live.view().clone()));
            while let Some(changed) = live.next_update().await {
                if changed {
                    link.send_message(Msg::Updated(live.view().clone()));
                }
            }
            log::debug!("{} leaderboard feed ended", game);
        };
        wasm_bindgen_futures::spawn_local(async move {
            if Abortable::new(feed, registration).await.is_err() {
                log::debug!("{} leaderboard feed stopped", game);
            }
        });
        Feed(handle)
    }

    fn open_feeds(ctx: &Context<Self>) -> Vec<Feed> {
        [GameType::Emojis, GameType::Puzzles]
            .into_iter()
            .map(|game| Self::open_feed(ctx, game))
            .collect()
    }
}

fn duration_cell(record: &CompletionRecord) -> String {
    format!("⏱️ {}", format_duration(record.duration_seconds))
}

impl Component for LeaderboardHost {
    type Message = Msg;
    type Properties = LeaderboardProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            puzzles: LeaderboardView::new(GameType::Puzzles),
            emojis: LeaderboardView::new(GameType::Emojis),
            feeds: Self::open_feeds(ctx),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Updated(view) => {
                let slot = match view.game() {
                    GameType::Puzzles => &mut self.puzzles,
                    GameType::Emojis => &mut self.emojis,
                };
                if *slot == view {
                    false
                } else {
                    *slot = view;
                    true
                }
            }
            Refresh => {
                log::debug!("reopening leaderboard feeds");
                // old feeds release their subscriptions before new ones are opened
                self.feeds.clear();
                self.feeds = Self::open_feeds(ctx);
                false
            }
            Home => {
                ctx.props().navigate.emit(Route::Home);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let configured = ctx.props().services.is_remote_configured();

        html! {
            <main class="leaderboard">
                <h1>{"Värdpanel: Spelstatus"}</h1>
                if !configured {
                    <p class="warning">{"Ingen databas konfigurerad, topplistorna är tomma."}</p>
                }
                <section>
                    <h2>{"🎶 Emoji-quiz Leaderboard"}</h2>
                    <table>
                        <tbody>
                            {
                                for self.emojis.records().iter().enumerate().map(|(index, record)| html! {
                                    <tr>
                                        <td>{rank_label(index)}</td>
                                        <td>{record.team_name.clone()}</td>
                                        <td>{duration_cell(record)}</td>
                                        <td>{local_time(record.completed_at)}</td>
                                    </tr>
                                })
                            }
                            if self.emojis.is_empty() {
                                <tr><td colspan="4">{"Väntar på första laget..."}</td></tr>
                            }
                        </tbody>
                    </table>
                </section>
                <section>
                    <h2>{"🔥 Tändsticksproblem (Live)"}</h2>
                    {
                        for PUZZLES.iter().map(|puzzle| {
                            let solvers: Vec<&CompletionRecord> = self.puzzles.for_puzzle(puzzle.id).collect();
                            html! {
                                <article key={puzzle.id}>
                                    <h3>{format!("Pussel #{}", puzzle.id)}</h3>
                                    <ol>
                                        {
                                            for solvers.iter().map(|record| html! {
                                                <li>
                                                    <span>{record.team_name.clone()}</span>
                                                    <span>{duration_cell(record)}</span>
                                                </li>
                                            })
                                        }
                                    </ol>
                                    if solvers.is_empty() {
                                        <p>{"Ingen har löst detta än"}</p>
                                    }
                                </article>
                            }
                        })
                    }
                </section>
                <footer>
                    <button onclick={ctx.link().callback(|_| Refresh)}>{"Uppdatera Data Manuellt"}</button>
                    <button onclick={ctx.link().callback(|_| Home)}>{"← Tillbaka till start"}</button>
                </footer>
            </main>
        }
    }
}
