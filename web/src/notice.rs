use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct NoticeProps {
    pub text: AttrValue,
    pub on_dismiss: Callback<()>,
}

/// Transient error banner, dismissed on click.
#[function_component]
pub(crate) fn NoticePopup(props: &NoticeProps) -> Html {
    let dismiss = props.on_dismiss.reform(|_: MouseEvent| ());

    html! {
        <div class="popup error" role="status" onclick={dismiss}>
            {props.text.clone()}
        </div>
    }
}
