//! Create / edit form for a single article

use std::rc::Rc;

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::article::ArticleDraft;
use crate::backend::Services;
use crate::form::{ArticleForm, Field, FormState, SUCCESS_CLOSE_DELAY_MS};
use crate::metadata::MetadataFetcher;
use crate::ui::components::{BusyLabel, TagChips};
use crate::ui::sleep_ms;

#[derive(Properties, PartialEq)]
pub struct ArticleFormModalProps {
    pub services: Rc<Services>,
    pub show: bool,
    #[prop_or_default]
    pub draft: Option<ArticleDraft>,
    pub title: AttrValue,
    pub on_hide: Callback<()>,
}

#[function_component(ArticleFormModal)]
pub fn article_form_modal(props: &ArticleFormModalProps) -> Html {
    let form = use_mut_ref(ArticleForm::default);
    let trigger = use_force_update();

    // Reset whenever the modal is shown or given a different draft
    {
        let form = form.clone();
        let trigger = trigger.clone();
        use_effect_with((props.show, props.draft.clone()), move |(show, draft)| {
            if *show {
                form.borrow_mut().open(draft.as_ref());
            } else {
                form.borrow_mut().close();
            }
            trigger.force_update();
            || ()
        });
    }

    let on_field = {
        let form = form.clone();
        let trigger = trigger.clone();
        move |field: Field| {
            let form = form.clone();
            let trigger = trigger.clone();
            Callback::from(move |e: InputEvent| {
                let value = e
                    .target_dyn_into::<HtmlInputElement>()
                    .map(|input| input.value())
                    .or_else(|| e.target_dyn_into::<HtmlTextAreaElement>().map(|t| t.value()));
                if let Some(value) = value {
                    form.borrow_mut().set_field(field, &value);
                    trigger.force_update();
                }
            })
        }
    };

    let on_tags_input = {
        let form = form.clone();
        let trigger = trigger.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                form.borrow_mut().set_tags_text(&input.value());
                trigger.force_update();
            }
        })
    };

    let on_remove_tag = {
        let form = form.clone();
        let trigger = trigger.clone();
        Callback::from(move |tag: String| {
            form.borrow_mut().remove_tag(&tag);
            trigger.force_update();
        })
    };

    let on_fetch_metadata = {
        let form = form.clone();
        let trigger = trigger.clone();
        let fetcher = props.services.metadata.clone();

        Callback::from(move |_| {
            let url = form.borrow_mut().begin_metadata_fetch();
            trigger.force_update();

            if let Some(url) = url {
                let form = form.clone();
                let trigger = trigger.clone();
                let fetcher = fetcher.clone();
                spawn_local(async move {
                    let result = fetcher.fetch(&url).await;
                    form.borrow_mut().finish_metadata_fetch(result);
                    trigger.force_update();
                });
            }
        })
    };

    let on_submit = {
        let form = form.clone();
        let trigger = trigger.clone();
        let services = props.services.clone();
        let on_hide = props.on_hide.clone();

        Callback::from(move |_| {
            let begun = form.borrow_mut().begin_submit();
            trigger.force_update();

            match begun {
                Some(Ok(draft)) => {
                    let form = form.clone();
                    let trigger = trigger.clone();
                    let services = services.clone();
                    let on_hide = on_hide.clone();

                    spawn_local(async move {
                        let session = services.session.session();
                        let result = services
                            .gateway
                            .save_articles(session.as_ref(), vec![draft])
                            .await;
                        form.borrow_mut().finish_submit(&result);
                        trigger.force_update();

                        if result.is_ok() {
                            sleep_ms(SUCCESS_CLOSE_DELAY_MS).await;
                            form.borrow_mut().close_after_success();
                            trigger.force_update();
                            on_hide.emit(());
                        }
                    });
                }
                Some(Err(e)) => log::debug!("Form rejected: {}", e),
                None => {}
            }
        })
    };

    let on_cancel = {
        let form = form.clone();
        let trigger = trigger.clone();
        let on_hide = props.on_hide.clone();
        Callback::from(move |_| {
            form.borrow_mut().close();
            trigger.force_update();
            on_hide.emit(());
        })
    };

    let current = form.borrow().clone();
    if !current.is_open() {
        return html! {};
    }

    let fields = current.fields();
    let submitting = current.is_submitting();
    let saved_message = match current.state() {
        FormState::Saved { message } => Some(message.clone()),
        _ => None,
    };
    let url_class = if current.url_hint().is_some() {
        "pf-v5-c-form-control pf-m-error"
    } else {
        "pf-v5-c-form-control"
    };

    html! {
        <div class="modal-backdrop">
            <div class="modal-box" role="dialog" aria-modal="true">
                <div class="modal-header">
                    <h2 class="modal-title">{props.title.clone()}</h2>
                    <button class="modal-close" aria-label="Close" onclick={on_cancel.clone()}>{"×"}</button>
                </div>

                if let Some(err) = current.error() {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.to_string()}
                    </Alert>
                }
                if let Some(msg) = saved_message {
                    <Alert r#type={AlertType::Success} title={msg} inline={true}>
                    </Alert>
                }

                <div class="form-group">
                    <label class="form-label">{"URL"}</label>
                    <input
                        type="url"
                        class={url_class}
                        value={fields.url.clone()}
                        oninput={on_field(Field::Url)}
                    />
                    if let Some(hint) = current.url_hint() {
                        <p class="form-error-text">{hint.to_string()}</p>
                    }
                    <Button
                        onclick={on_fetch_metadata}
                        disabled={submitting || current.is_fetching_metadata()}
                        variant={ButtonVariant::Link}
                    >
                        <BusyLabel
                            busy={current.is_fetching_metadata()}
                            label="Fetch details"
                            busy_label="Fetching..."
                        />
                    </Button>
                    if let Some(err) = current.metadata_error() {
                        <p class="form-warning-text">{err.to_string()}</p>
                    }
                </div>

                <div class="form-group">
                    <label class="form-label">{"Title"}</label>
                    <input
                        type="text"
                        class="pf-v5-c-form-control"
                        value={fields.title.clone()}
                        oninput={on_field(Field::Title)}
                    />
                </div>

                <div class="form-group">
                    <label class="form-label">{"Description"}</label>
                    <textarea
                        class="pf-v5-c-form-control"
                        value={fields.description.clone()}
                        oninput={on_field(Field::Description)}
                    />
                </div>

                <div class="form-group">
                    <label class="form-label">{"Image URL"}</label>
                    <input
                        type="url"
                        class="pf-v5-c-form-control"
                        value={fields.image_url.clone()}
                        oninput={on_field(Field::ImageUrl)}
                    />
                    if !fields.image_url.is_empty() {
                        <img class="form-image-preview" src={fields.image_url.clone()} alt="" />
                    }
                </div>

                <div class="form-group">
                    <label class="form-label">{"Site name"}</label>
                    <input
                        type="text"
                        class="pf-v5-c-form-control"
                        value={fields.site_name.clone()}
                        oninput={on_field(Field::SiteName)}
                    />
                </div>

                <div class="form-group">
                    <label class="form-label">{"Publisher"}</label>
                    <input
                        type="text"
                        class="pf-v5-c-form-control"
                        value={fields.publisher.clone()}
                        oninput={on_field(Field::Publisher)}
                    />
                </div>

                <div class="form-group">
                    <label class="form-label">{"Tags (comma-separated)"}</label>
                    <input
                        type="text"
                        class="pf-v5-c-form-control"
                        value={fields.tags.text().to_string()}
                        oninput={on_tags_input}
                    />
                    <TagChips
                        tags={fields.tags.tags().to_vec()}
                        on_remove={on_remove_tag}
                        disabled={submitting}
                    />
                </div>

                <div class="modal-footer">
                    <Button onclick={on_submit} disabled={submitting} variant={ButtonVariant::Primary}>
                        <BusyLabel busy={submitting} label="Save" />
                    </Button>
                    <Button onclick={on_cancel} disabled={submitting} variant={ButtonVariant::Secondary}>
                        {"Cancel"}
                    </Button>
                </div>
            </div>
        </div>
    }
}
