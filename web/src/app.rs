use std::rc::Rc;

use futures_util::StreamExt;
use gloo::history::{BrowserHistory, History, HistoryListener};
use gloo::timers::callback::Timeout;
use julkvall_core::{GameType, puzzle_count};
use yew::prelude::*;

use crate::emoji::{EmojiQuizView, EmojiSolutions};
use crate::forehead::ForeheadView;
use crate::home::Home;
use crate::leaderboard::LeaderboardHost;
use crate::notice::NoticePopup;
use crate::puzzle::PuzzleView;
use crate::remote::RemoteConfig;
use crate::routes::Route;
use crate::services::Services;

const NOTICE_MS: u32 = 5_000;

#[derive(Properties, PartialEq)]
pub(crate) struct AppProps {
    pub config: Option<RemoteConfig>,
}

#[derive(Debug)]
pub(crate) enum Msg {
    LocationChanged,
    Navigate(Route),
    Notice(String),
    DismissNotice,
}

struct ActiveNotice {
    text: AttrValue,
    _timeout: Timeout,
}

pub(crate) struct App {
    services: Rc<Services>,
    history: BrowserHistory,
    route: Route,
    notice: Option<ActiveNotice>,
    _listener: HistoryListener,
}

impl App {
    /// Reads the current location, rewriting it when it points at a puzzle that is not open.
    fn current_route(&self) -> Route {
        let requested = Route::parse(self.history.location().path());
        let resolved = {
            let progress = self.services.progress.get(GameType::Puzzles);
            requested.resolve(progress.solved(), puzzle_count())
        };
        if resolved != requested && requested != Route::NotFound {
            self.history.replace(resolved.path());
        }
        resolved
    }
}

impl Component for App {
    type Message = Msg;
    type Properties = AppProps;

    fn create(ctx: &Context<Self>) -> Self {
        let (services, mut errors) = Services::new(ctx.props().config.clone());

        let link = ctx.link().clone();
        wasm_bindgen_futures::spawn_local(async move {
            while let Some(err) = errors.next().await {
                log::warn!("{}", err);
                link.send_message(Msg::Notice(err.to_string()));
            }
        });

        let history = BrowserHistory::new();
        let link = ctx.link().clone();
        let listener = history.listen(move || link.send_message(Msg::LocationChanged));

        let mut app = Self {
            services: Rc::new(services),
            history,
            route: Route::Home,
            notice: None,
            _listener: listener,
        };
        app.route = app.current_route();
        app
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            LocationChanged => {
                let route = self.current_route();
                if self.route == route {
                    false
                } else {
                    log::debug!("route: {:?}", route);
                    self.route = route;
                    true
                }
            }
            Navigate(route) => {
                // the history listener picks up the new location
                self.history.push(route.path());
                false
            }
            Notice(text) => {
                let link = ctx.link().clone();
                self.notice = Some(ActiveNotice {
                    text: text.into(),
                    _timeout: Timeout::new(NOTICE_MS, move || link.send_message(DismissNotice)),
                });
                true
            }
            DismissNotice => self.notice.take().is_some(),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let services = self.services.clone();
        let navigate = ctx.link().callback(Msg::Navigate);

        let page = match self.route {
            Route::Home | Route::NotFound => html! { <Home {services} {navigate}/> },
            Route::Puzzle(puzzle_id) => html! { <PuzzleView {services} {puzzle_id} {navigate}/> },
            Route::Emojis => html! { <EmojiQuizView {services} {navigate}/> },
            Route::EmojiSolutions => html! { <EmojiSolutions {navigate}/> },
            Route::Forehead => html! { <ForeheadView {services} {navigate}/> },
            Route::Leaderboard => html! { <LeaderboardHost {services} {navigate}/> },
        };

        html! {
            <>
                {page}
                if let Some(notice) = &self.notice {
                    <NoticePopup
                        text={notice.text.clone()}
                        on_dismiss={ctx.link().callback(|()| Msg::DismissNotice)}
                    />
                }
            </>
        }
    }
}
