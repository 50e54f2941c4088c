use yew::prelude::*;

use crate::utils::input_value;

#[derive(Properties, PartialEq)]
pub(crate) struct TeamFormProps {
    #[prop_or_default]
    pub initial: AttrValue,
    pub action: AttrValue,
    pub on_submit: Callback<String>,
}

/// Team name entry; blank names are not submitted.
#[function_component]
pub(crate) fn TeamForm(props: &TeamFormProps) -> Html {
    let name = use_state(|| props.initial.to_string());

    let oninput = {
        let name = name.clone();
        Callback::from(move |e: InputEvent| name.set(input_value(e)))
    };

    let onsubmit = {
        let name = name.clone();
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if name.trim().is_empty() {
                log::trace!("ignoring blank team name");
                return;
            }
            on_submit.emit((*name).clone());
        })
    };

    let blank = name.trim().is_empty();
    html! {
        <form class="team" {onsubmit}>
            <input type="text" placeholder="Lag Rudolf..." value={(*name).clone()} {oninput}/>
            <button type="submit" disabled={blank}>{props.action.clone()}</button>
        </form>
    }
}
