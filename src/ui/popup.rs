/// Popup UI for the DashStash extension

use std::rc::Rc;

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::article::{ArticleDraft, is_valid_url};
use crate::backend::{Services, chrome};
use crate::config::Config;
use crate::notice::Notice;
use crate::session::{OAuthProvider, SessionSnapshot, SignUpOutcome};
use crate::tabs::TabCollection;
use crate::ui::components::{BusyLabel, StatusBanner};
use crate::ui::form_modal::ArticleFormModal;

#[function_component(App)]
pub fn app() -> Html {
    let services = use_memo((), |_| {
        Config::from_build_env().map(|config| Rc::new(Services::new(config)))
    });

    match &*services {
        Ok(services) => html! { <Popup services={services.clone()} /> },
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            html! {
                <div class="padding-20">
                    <Alert r#type={AlertType::Danger} title={"Configuration error"} inline={true}>
                        {e.to_string()}
                    </Alert>
                </div>
            }
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct ServicesProps {
    pub services: Rc<Services>,
}

/// Sign-in gate. Follows the session holder for as long as the popup is open.
#[function_component(Popup)]
pub fn popup(props: &ServicesProps) -> Html {
    let snapshot = use_state(|| props.services.session.snapshot());

    {
        let snapshot = snapshot.clone();
        let services = props.services.clone();
        use_effect_with((), move |_| {
            let subscription = {
                let snapshot = snapshot.clone();
                services
                    .session
                    .observe(move |next: &SessionSnapshot| snapshot.set(next.clone()))
            };

            let holder = services.session.clone();
            spawn_local(async move {
                holder.load().await;
            });

            move || {
                subscription.unsubscribe();
                services.session.disconnect();
            }
        });
    }

    let body = if snapshot.loading {
        html! {
            <div class="loading-text-center">
                <Spinner />
                <p class="loading-text">{"Loading..."}</p>
            </div>
        }
    } else if let Some(user) = &snapshot.user {
        html! {
            <MainView services={props.services.clone()} email={user.email.clone().unwrap_or_default()} />
        }
    } else {
        html! { <SignInView services={props.services.clone()} /> }
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"DashStash"}</h1>
            {body}
        </div>
    }
}

#[function_component(SignInView)]
fn sign_in_view(props: &ServicesProps) -> Html {
    let email = use_state(String::new);
    let password = use_state(String::new);
    let busy = use_state(|| false);
    let notice = use_state(|| None::<Notice>);

    let on_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                email.set(input.value());
            }
        })
    };

    let on_password = {
        let password = password.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                password.set(input.value());
            }
        })
    };

    // Success needs no handling here: the session observer swaps the view.
    let on_sign_in = {
        let (email, password) = (email.clone(), password.clone());
        let (busy, notice) = (busy.clone(), notice.clone());
        let services = props.services.clone();

        Callback::from(move |_| {
            if *busy {
                return;
            }
            let (email, password) = ((*email).clone(), (*password).clone());
            let (busy, notice) = (busy.clone(), notice.clone());
            let services = services.clone();

            busy.set(true);
            notice.set(None);
            spawn_local(async move {
                if let Err(e) = services.session.sign_in(&email, &password).await {
                    log::warn!("Sign in failed: {}", e);
                    notice.set(Some(Notice::Error(e.to_string())));
                }
                busy.set(false);
            });
        })
    };

    let on_sign_up = {
        let (email, password) = (email.clone(), password.clone());
        let (busy, notice) = (busy.clone(), notice.clone());
        let services = props.services.clone();

        Callback::from(move |_| {
            if *busy {
                return;
            }
            let (email, password) = ((*email).clone(), (*password).clone());
            let (busy, notice) = (busy.clone(), notice.clone());
            let services = services.clone();

            busy.set(true);
            notice.set(None);
            spawn_local(async move {
                match services.session.sign_up(&email, &password).await {
                    Ok(SignUpOutcome::SignedIn) => {}
                    Ok(SignUpOutcome::ConfirmationPending) => {
                        notice.set(Some(Notice::success(
                            "Check your email to confirm your account, then sign in.",
                        )));
                    }
                    Err(e) => {
                        log::warn!("Sign up failed: {}", e);
                        notice.set(Some(Notice::Error(e.to_string())));
                    }
                }
                busy.set(false);
            });
        })
    };

    let on_google = {
        let notice = notice.clone();
        let services = props.services.clone();

        Callback::from(move |_| {
            let notice = notice.clone();
            let services = services.clone();
            spawn_local(async move {
                if let Err(e) = services
                    .session
                    .sign_in_with_oauth(OAuthProvider::Google, None)
                    .await
                {
                    log::warn!("OAuth sign in failed: {}", e);
                    notice.set(Some(Notice::Error(e.to_string())));
                }
            });
        })
    };

    let on_open_web_app = {
        let web_app_url = props.services.config.web_app_url.clone();
        Callback::from(move |_| {
            let web_app_url = web_app_url.clone();
            spawn_local(async move {
                if let Err(e) = chrome::open_tab(&web_app_url).await {
                    log::warn!("{}", e);
                }
            });
        })
    };

    html! {
        <div class="flex-column-gap">
            <StatusBanner notice={(*notice).clone()} />

            <input
                type="email"
                class="pf-v5-c-form-control"
                placeholder="Email"
                value={(*email).clone()}
                oninput={on_email}
            />
            <input
                type="password"
                class="pf-v5-c-form-control"
                placeholder="Password"
                value={(*password).clone()}
                oninput={on_password}
            />

            <Button onclick={on_sign_in} disabled={*busy} variant={ButtonVariant::Primary} block={true}>
                <BusyLabel busy={*busy} label="Sign In" busy_label="Signing in..." />
            </Button>
            <Button onclick={on_sign_up} disabled={*busy} variant={ButtonVariant::Secondary} block={true}>
                {"Sign Up"}
            </Button>
            <Button onclick={on_google} disabled={*busy} variant={ButtonVariant::Secondary} block={true}>
                {"Sign in with Google"}
            </Button>
            <Button onclick={on_open_web_app} variant={ButtonVariant::Link} block={true}>
                {"Open DashStash"}
            </Button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct MainViewProps {
    services: Rc<Services>,
    email: String,
}

#[function_component(MainView)]
fn main_view(props: &MainViewProps) -> Html {
    let tabs = use_mut_ref(TabCollection::default);
    let trigger = use_force_update();
    let notice = use_state(|| None::<Notice>);
    let saving = use_state(|| false);
    let manual_url = use_state(String::new);
    let show_form = use_state(|| false);
    let form_draft = use_state(|| None::<ArticleDraft>);

    // Query tabs on mount
    {
        let tabs = tabs.clone();
        let trigger = trigger.clone();
        let notice = notice.clone();
        let services = props.services.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match TabCollection::load(&services.tabs).await {
                    Ok(loaded) => {
                        *tabs.borrow_mut() = loaded;
                        trigger.force_update();
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        notice.set(Some(Notice::Error(e.to_string())));
                    }
                }
            });
            || ()
        });
    }

    let save_one = {
        let saving = saving.clone();
        let notice = notice.clone();
        let manual_url = manual_url.clone();
        let services = props.services.clone();

        move |draft: ArticleDraft, clear_manual: bool| {
            if *saving {
                return;
            }
            let saving = saving.clone();
            let notice = notice.clone();
            let manual_url = manual_url.clone();
            let services = services.clone();

            saving.set(true);
            notice.set(None);
            spawn_local(async move {
                let url = draft.url.trim().to_string();
                let session = services.session.session();
                let result = services
                    .gateway
                    .save_articles(session.as_ref(), vec![draft])
                    .await;
                if result.is_ok() && clear_manual {
                    manual_url.set(String::new());
                }
                notice.set(Some(Notice::saved(&url, &result)));
                saving.set(false);
            });
        }
    };

    let on_save_current = {
        let tabs = tabs.clone();
        let save_one = save_one.clone();
        Callback::from(move |_| {
            let draft = tabs.borrow().active_tab().map(ArticleDraft::from);
            if let Some(draft) = draft {
                save_one(draft, false);
            }
        })
    };

    let on_manual_input = {
        let manual_url = manual_url.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                manual_url.set(input.value());
            }
        })
    };

    let on_save_manual = {
        let manual_url = manual_url.clone();
        Callback::from(move |_| {
            let url = manual_url.trim().to_string();
            if !url.is_empty() {
                save_one(ArticleDraft::new(url, ""), true);
            }
        })
    };

    let on_edit_current = {
        let tabs = tabs.clone();
        let show_form = show_form.clone();
        let form_draft = form_draft.clone();
        Callback::from(move |_| {
            form_draft.set(tabs.borrow().active_tab().map(ArticleDraft::from));
            show_form.set(true);
        })
    };

    let on_new_article = {
        let show_form = show_form.clone();
        let form_draft = form_draft.clone();
        Callback::from(move |_| {
            form_draft.set(None);
            show_form.set(true);
        })
    };

    let on_hide_form = {
        let show_form = show_form.clone();
        Callback::from(move |_| show_form.set(false))
    };

    let on_select_all = {
        let tabs = tabs.clone();
        let trigger = trigger.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                tabs.borrow_mut().select_all(input.checked());
                trigger.force_update();
            }
        })
    };

    let on_toggle = {
        let tabs = tabs.clone();
        let trigger = trigger.clone();
        move |id: i32| {
            let tabs = tabs.clone();
            let trigger = trigger.clone();
            Callback::from(move |_: Event| {
                tabs.borrow_mut().toggle(id);
                trigger.force_update();
            })
        }
    };

    let on_save_selected = {
        let tabs = tabs.clone();
        let trigger = trigger.clone();
        let notice = notice.clone();
        let services = props.services.clone();

        Callback::from(move |_| {
            let batch = tabs.borrow_mut().begin_submit();
            trigger.force_update();

            if let Some(drafts) = batch {
                let tabs = tabs.clone();
                let trigger = trigger.clone();
                let notice = notice.clone();
                let services = services.clone();

                notice.set(None);
                spawn_local(async move {
                    log::debug!("Saving {} tabs", drafts.len());
                    let session = services.session.session();
                    let result = services
                        .gateway
                        .save_articles(session.as_ref(), drafts)
                        .await;
                    let outcome = tabs.borrow_mut().finish_submit(&result);
                    notice.set(Some(outcome));
                    trigger.force_update();
                });
            }
        })
    };

    let on_sign_out = {
        let notice = notice.clone();
        let services = props.services.clone();
        Callback::from(move |_| {
            let notice = notice.clone();
            let services = services.clone();
            spawn_local(async move {
                if let Err(e) = services.session.sign_out().await {
                    log::warn!("Sign out failed: {}", e);
                    notice.set(Some(Notice::Error(e.to_string())));
                }
            });
        })
    };

    let collection = tabs.borrow().clone();
    let batch_busy = collection.is_busy();
    let manual_invalid = !manual_url.trim().is_empty() && !is_valid_url(&manual_url);

    html! {
        <div class="flex-column-gap">
            <div class="user-bar">
                <span class="user-email">{format!("Logged in as: {}", props.email)}</span>
                <Button onclick={on_sign_out} variant={ButtonVariant::Link}>
                    {"Sign Out"}
                </Button>
            </div>

            <StatusBanner notice={(*notice).clone()} />

            if let Some(active) = collection.active_tab() {
                <div class="current-tab">
                    <p class="current-tab-title">{active.title.clone()}</p>
                    <p class="current-tab-url">{active.url.clone()}</p>
                    <Button onclick={on_save_current} disabled={*saving} variant={ButtonVariant::Primary} block={true}>
                        <BusyLabel busy={*saving} label="Save Current Tab" />
                    </Button>
                    <Button onclick={on_edit_current} disabled={*saving} variant={ButtonVariant::Secondary} block={true}>
                        {"Edit Details & Save"}
                    </Button>
                </div>
            }

            <div class="manual-url">
                <input
                    type="url"
                    class={if manual_invalid { "pf-v5-c-form-control pf-m-error" } else { "pf-v5-c-form-control" }}
                    placeholder="https://..."
                    value={(*manual_url).clone()}
                    oninput={on_manual_input}
                />
                <Button
                    onclick={on_save_manual}
                    disabled={*saving || manual_url.trim().is_empty()}
                    variant={ButtonVariant::Secondary}
                >
                    {"Save URL"}
                </Button>
            </div>

            <Button onclick={on_new_article} variant={ButtonVariant::Link} block={true}>
                {"Add Article Manually"}
            </Button>

            if !collection.tabs().is_empty() {
                <div class="tab-list">
                    <label class="tab-row select-all">
                        <input
                            type="checkbox"
                            checked={collection.all_selected()}
                            disabled={batch_busy}
                            onchange={on_select_all}
                        />
                        {"Select all"}
                    </label>
                    {for collection.tabs().iter().map(|tab| html! {
                        <label class="tab-row" key={tab.id}>
                            <input
                                type="checkbox"
                                checked={collection.is_selected(tab.id)}
                                disabled={batch_busy}
                                onchange={on_toggle(tab.id)}
                            />
                            <span class="tab-title" title={tab.url.clone()}>
                                {if tab.title.is_empty() { tab.url.clone() } else { tab.title.clone() }}
                            </span>
                        </label>
                    })}
                </div>

                <Button
                    onclick={on_save_selected}
                    disabled={batch_busy || collection.selected_count() == 0}
                    variant={ButtonVariant::Primary}
                    block={true}
                >
                    <BusyLabel
                        busy={batch_busy}
                        label={format!("Save Selected Tabs ({})", collection.selected_count())}
                    />
                </Button>
            }

            <ArticleFormModal
                services={props.services.clone()}
                show={*show_form}
                draft={(*form_draft).clone()}
                title={if form_draft.is_some() { "Save Article" } else { "Add Article" }}
                on_hide={on_hide_form}
            />
        </div>
    }
}
