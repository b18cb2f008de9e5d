//! Reusable UI components

use patternfly_yew::prelude::*;
use yew::prelude::*;

use crate::notice::Notice;

#[derive(Properties, PartialEq)]
pub struct StatusBannerProps {
    pub notice: Option<Notice>,
}

/// Inline success / error banner.
#[function_component(StatusBanner)]
pub fn status_banner(props: &StatusBannerProps) -> Html {
    match &props.notice {
        Some(Notice::Success(msg)) => html! {
            <Alert r#type={AlertType::Success} title={msg.clone()} inline={true}>
            </Alert>
        },
        Some(Notice::Error(msg)) => html! {
            <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                {msg.clone()}
            </Alert>
        },
        None => html! {},
    }
}

#[derive(Properties, PartialEq)]
pub struct TagChipsProps {
    pub tags: Vec<String>,
    pub on_remove: Callback<String>,
    #[prop_or(false)]
    pub disabled: bool,
}

/// One removable chip per tag.
#[function_component(TagChips)]
pub fn tag_chips(props: &TagChipsProps) -> Html {
    if props.tags.is_empty() {
        return html! {};
    }

    html! {
        <div class="tag-chips">
            {for props.tags.iter().map(|tag| {
                let on_remove = props.on_remove.clone();
                let value = tag.clone();
                let onclick = Callback::from(move |_: MouseEvent| on_remove.emit(value.clone()));
                html! {
                    <span class="tag-chip" key={tag.clone()}>
                        <span class="tag-chip-text">{tag}</span>
                        <button
                            class="tag-chip-remove"
                            aria-label={format!("Remove tag {}", tag)}
                            disabled={props.disabled}
                            {onclick}
                        >
                            {"×"}
                        </button>
                    </span>
                }
            })}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct BusyLabelProps {
    pub busy: bool,
    pub label: AttrValue,
    #[prop_or(AttrValue::Static("Saving..."))]
    pub busy_label: AttrValue,
}

/// Button label that turns into a spinner while an action is in flight.
#[function_component(BusyLabel)]
pub fn busy_label(props: &BusyLabelProps) -> Html {
    if props.busy {
        html! {
            <>
                <Spinner />
                <span class="busy-label">{props.busy_label.clone()}</span>
            </>
        }
    } else {
        html! { {props.label.clone()} }
    }
}
