use crate::autosave::SaveStatus;
use crate::components::ui::{
    Badge, Button, ButtonSize, ButtonVariant, Input, NoteCard, NoteCardBody, NoteCardFooter,
    NoteCardTitle, Spinner, TextArea, Toolbar,
};
use crate::export;
use crate::models::{Category, Note, NoteBody, ViewMode};
use crate::session::SessionTarget;
use crate::state::{schedule, AppContext, AppState};
use crate::util::{format_relative, format_timestamp, now_ms};
use crate::workspace::SaveOutcome;
use icons::{Check, X};
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use strum::IntoEnumIterator;

fn app_state() -> AppState {
    expect_context::<AppContext>().0
}

fn save_now(state: AppState) {
    match state.update(|ws| ws.save(now_ms())) {
        Some(Ok(SaveOutcome::Saved { indicator, .. })) => {
            schedule(state, indicator);
            state.sync_body_text();
        }
        Some(Ok(SaveOutcome::NothingToSave)) | None => {}
        Some(Err(e)) => state.report(e),
    }
}

fn open_note(state: AppState, id: &str) {
    match state.update(|ws| ws.edit_note(id)) {
        Some(Err(e)) => state.report(e),
        _ => state.sync_body_text(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new();
    provide_context(AppContext(state));

    // Cmd/Ctrl+S saves, Cmd/Ctrl+Z undoes, Shift+Cmd/Ctrl+Z redoes.
    let _key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if !(ev.meta_key() || ev.ctrl_key()) {
            return;
        }
        match ev.key().to_lowercase().as_str() {
            "s" => {
                ev.prevent_default();
                save_now(state);
            }
            "z" => {
                ev.prevent_default();
                if ev.shift_key() {
                    state.dispatch(|ws| ws.redo());
                } else {
                    state.dispatch(|ws| ws.undo());
                }
                state.sync_body_text();
            }
            _ => {}
        }
    });

    view! {
        <div class=move || {
            if state.dark_theme.get() {
                "dark min-h-screen bg-background text-foreground"
            } else {
                "min-h-screen bg-background text-foreground"
            }
        }>
            <Header />
            <ErrorBanner />
            <div class="mx-auto flex max-w-6xl gap-6 px-4 py-6">
                <CategoryNav />
                <main class="min-w-0 flex-1 space-y-6">
                    <Editor />
                    <TrashActions />
                    <NoteList />
                </main>
            </div>
            <NotificationsPanel />
        </div>
    }
}

#[component]
fn Header() -> impl IntoView {
    let state = app_state();
    let unread = move || state.read(|ws| ws.notifications().unread_count());

    view! {
        <header class="sticky top-0 z-10 border-b border-border bg-background/95 backdrop-blur">
            <div class="mx-auto flex max-w-6xl items-center gap-3 px-4 py-3">
                <h1 class="text-lg font-semibold">"NatePad"</h1>
                <div class="min-w-0 flex-1">
                    <Input
                        r#type="search"
                        placeholder="Search notes…"
                        value=state.search_query
                        on_input=Callback::new(move |v: String| state.search_query.set(v))
                    />
                </div>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    attr:title="Toggle layout"
                    on:click=move |_| {
                        let next = match state.view_mode.get_untracked() {
                            ViewMode::Grid => ViewMode::List,
                            ViewMode::List => ViewMode::Grid,
                        };
                        state.set_view_mode(next);
                    }
                >
                    {move || match state.view_mode.get() {
                        ViewMode::Grid => "List",
                        ViewMode::List => "Grid",
                    }}
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    attr:title="Toggle theme"
                    on:click=move |_| state.toggle_dark_theme()
                >
                    {move || if state.dark_theme.get() { "Light" } else { "Dark" }}
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    attr:title="Notifications"
                    on:click=move |_| state.notifications_open.update(|o| *o = !*o)
                >
                    "Notifications"
                    <Show when=move || { unread() > 0 } fallback=|| ().into_view()>
                        <Badge>{unread}</Badge>
                    </Show>
                </Button>
            </div>
        </header>
    }
}

#[component]
fn ErrorBanner() -> impl IntoView {
    let state = app_state();

    view! {
        <Show when=move || state.last_error.get().is_some() fallback=|| ().into_view()>
            <div class="mx-auto mt-3 flex max-w-6xl items-center justify-between rounded-md border border-destructive px-4 py-2 text-sm text-destructive">
                <span>{move || state.last_error.get().unwrap_or_default()}</span>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Icon
                    attr:title="Dismiss"
                    on:click=move |_| state.last_error.set(None)
                >
                    <X />
                </Button>
            </div>
        </Show>
    }
}

#[component]
fn CategoryNav() -> impl IntoView {
    let state = app_state();

    view! {
        <nav class="w-44 shrink-0 space-y-1">
            {Category::iter()
                .map(|cat| {
                    let count = move || state.read(|ws| ws.query(cat, None).len());
                    let class = move || {
                        if state.category.get() == cat {
                            "flex w-full items-center justify-between rounded-md bg-accent px-3 py-2 text-sm font-medium text-accent-foreground"
                        } else {
                            "flex w-full items-center justify-between rounded-md px-3 py-2 text-sm hover:bg-accent"
                        }
                    };
                    view! {
                        <button class=class on:click=move |_| state.category.set(cat)>
                            <span>{cat.label()}</span>
                            <span class="text-xs text-muted-foreground">{count}</span>
                        </button>
                    }
                })
                .collect_view()}
        </nav>
    }
}

#[component]
fn SaveIndicator() -> impl IntoView {
    let state = app_state();

    move || {
        use leptos::prelude::IntoAny;

        state.read(|ws| match ws.status() {
            SaveStatus::Idle => ().into_any(),
            SaveStatus::Saving => view! {
                <span class="flex items-center gap-1 text-xs text-muted-foreground">
                    <Spinner />
                    "Saving…"
                </span>
            }
            .into_any(),
            SaveStatus::Saved { at_ms } => {
                let when = format_relative(*at_ms, now_ms());
                view! {
                    <span class="flex items-center gap-1 text-xs text-muted-foreground">
                        <Check class="size-4" />
                        {format!("Saved {when}")}
                    </span>
                }
                .into_any()
            }
            SaveStatus::Failed { message } => {
                let message = message.clone();
                view! {
                    <span class="text-xs text-destructive" title=message>
                        "Not saved"
                    </span>
                }
                .into_any()
            }
        })
    }
}

#[component]
fn Editor() -> impl IntoView {
    let state = app_state();

    let heading = move || {
        state.read(|ws| match ws.session().map(|s| s.target()) {
            Some(SessionTarget::Existing(_)) => "Edit note",
            _ => "New note",
        })
    };
    let title = Signal::derive(move || {
        state.read(|ws| ws.draft().map(|d| d.title.clone()).unwrap_or_default())
    });
    let color = move || {
        state.read(|ws| {
            ws.draft()
                .map(|d| d.color.clone())
                .unwrap_or_else(|| ws.config().default_color.clone())
        })
    };
    let can_undo = move || state.read(|ws| ws.can_undo());
    let can_redo = move || state.read(|ws| ws.can_redo());
    let has_session = move || state.read(|ws| ws.session().is_some());

    let on_title = Callback::new(move |v: String| state.dispatch(|ws| ws.set_title(&v)));
    let on_body = Callback::new(move |v: String| {
        state.body_text.set(v.clone());
        state.dispatch(|ws| ws.set_body(NoteBody::parse_markup(&v)));
    });

    view! {
        <section
            class="space-y-3 rounded-xl border border-border p-4 shadow-sm"
            style=move || format!("background-color: {}", color())
        >
            <div class="flex items-center justify-between">
                <h2 class="text-sm font-semibold">{heading}</h2>
                <SaveIndicator />
            </div>
            <Input placeholder="Title" value=title on_input=on_title />
            <TextArea
                placeholder="Take a note…  (- [ ] for a checklist item, ![](url) for an image)"
                value=state.body_text
                on_input=on_body
            />
            <Toolbar>
                <input
                    type="color"
                    class="h-8 w-8 cursor-pointer rounded border border-border"
                    title="Note color"
                    prop:value=color
                    on:input=move |ev| {
                        let c = event_target_value(&ev);
                        state.dispatch(|ws| ws.set_color(&c));
                    }
                />
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    on:click=move |_| {
                        state.dispatch(|ws| ws.add_checklist_item());
                        state.sync_body_text();
                    }
                >
                    "Add checklist"
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    attr:disabled=move || !can_undo()
                    on:click=move |_| {
                        state.dispatch(|ws| ws.undo());
                        state.sync_body_text();
                    }
                >
                    "Undo"
                </Button>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Sm
                    attr:disabled=move || !can_redo()
                    on:click=move |_| {
                        state.dispatch(|ws| ws.redo());
                        state.sync_body_text();
                    }
                >
                    "Redo"
                </Button>
                <div class="flex-1" />
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    attr:disabled=move || !has_session()
                    on:click=move |_| {
                        state.update(|ws| ws.discard());
                        state.sync_body_text();
                    }
                >
                    "Discard"
                </Button>
                <Button size=ButtonSize::Sm on:click=move |_| save_now(state)>
                    "Save"
                </Button>
            </Toolbar>
        </section>
    }
}

#[component]
fn TrashActions() -> impl IntoView {
    let state = app_state();
    let has_trash = move || {
        state.category.get() == Category::Trash
            && state.read(|ws| !ws.query(Category::Trash, None).is_empty())
    };

    let empty_trash = move |_| {
        let confirmed = web_sys::window()
            .and_then(|w| {
                w.confirm_with_message("Permanently delete every note in the trash?")
                    .ok()
            })
            .unwrap_or(false);
        if confirmed {
            state.update(|ws| ws.empty_trash(now_ms()));
            state.sync_body_text();
        }
    };

    view! {
        <Show when=has_trash fallback=|| ().into_view()>
            <Toolbar class="justify-end">
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    on:click=move |_| {
                        state.update(|ws| ws.recover_all(now_ms()));
                    }
                >
                    "Recover all"
                </Button>
                <Button variant=ButtonVariant::Destructive size=ButtonSize::Sm on:click=empty_trash>
                    "Empty trash"
                </Button>
            </Toolbar>
        </Show>
    }
}

#[component]
fn NoteList() -> impl IntoView {
    let state = app_state();

    let notes = move || {
        let category = state.category.get();
        let term = state.search_query.get();
        state.read(|ws| ws.query(category, Some(&term)))
    };
    let container_class = move || match state.view_mode.get() {
        ViewMode::Grid => "grid gap-3 sm:grid-cols-2 lg:grid-cols-3",
        ViewMode::List => "flex flex-col gap-3",
    };

    view! {
        <div class=container_class>
            {move || {
                let notes = notes();
                if notes.is_empty() {
                    let empty = match state.category.get() {
                        Category::Trash => "Trash is empty.",
                        _ => "No notes here yet.",
                    };
                    return view! { <div class="text-sm text-muted-foreground">{empty}</div> }
                        .into_any();
                }
                notes
                    .into_iter()
                    .map(|note| view! { <NoteItem note=note /> })
                    .collect_view()
                    .into_any()
            }}
        </div>
    }
}

#[component]
fn NoteItem(note: Note) -> impl IntoView {
    let state = app_state();
    let view_category = state.category.get_untracked();

    let id = note.id.clone();
    let id_for_open = id.clone();
    let id_for_pin = id.clone();
    let id_for_share = id.clone();
    let id_for_delete = id;

    let text = export::plain_text(&note);
    let download_href = export::data_url(&text);
    let download_name = export::file_name(&note);
    let mailto = export::mailto_url(&note);
    let edited = format_relative(note.last_modified, now_ms());
    let created = format_timestamp(note.timestamp);

    let in_trash = note.trashed;
    let pinned = note.pinned;
    let share_link = note.share_link.clone().filter(|_| note.shared);
    let title = if note.title.is_empty() {
        "Untitled".to_string()
    } else {
        note.title.clone()
    };

    view! {
        <NoteCard
            attr:style=format!("background-color: {}", note.color)
            attr:title=format!("Created {created}")
            on:dblclick=move |_| {
                if !in_trash {
                    open_note(state, &id_for_open);
                }
            }
        >
            <div class="flex items-start justify-between gap-2">
                <NoteCardTitle>{title}</NoteCardTitle>
                <Show when=move || pinned fallback=|| ().into_view()>
                    <span class="text-xs text-muted-foreground">"Pinned"</span>
                </Show>
            </div>
            <NoteCardBody>{note.body.plain_text()}</NoteCardBody>
            {share_link.map(|link| {
                let href = link.clone();
                view! {
                    <div class="truncate text-xs">
                        <a class="underline" href=href>{link}</a>
                    </div>
                }
            })}
            <NoteCardFooter>
                <span>{edited}</span>
                <Toolbar class="opacity-0 group-hover:opacity-100">
                    <Show when=move || !in_trash fallback=|| ().into_view()>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click={
                                let id = id_for_pin.clone();
                                move |_| {
                                    if let Some(Err(e)) = state.update(|ws| ws.toggle_pin(&id)) {
                                        state.report(e);
                                    }
                                }
                            }
                        >
                            "Pin"
                        </Button>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click={
                                let id = id_for_share.clone();
                                move |_| {
                                    if let Some(Err(e)) = state.update(|ws| ws.share(&id, now_ms())) {
                                        state.report(e);
                                    }
                                }
                            }
                        >
                            "Share"
                        </Button>
                        <a
                            class="px-2 text-xs underline"
                            href=download_href.clone()
                            download=download_name.clone()
                        >
                            "Export"
                        </a>
                        <a class="px-2 text-xs underline" href=mailto.clone()>
                            "Email"
                        </a>
                    </Show>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        class="text-destructive"
                        on:click=move |_| {
                            match state.update(|ws| ws.delete(&id_for_delete, view_category)) {
                                Some(Err(e)) => state.report(e),
                                _ => state.sync_body_text(),
                            }
                        }
                    >
                        {if in_trash { "Delete forever" } else { "Delete" }}
                    </Button>
                </Toolbar>
            </NoteCardFooter>
        </NoteCard>
    }
}

#[component]
fn NotificationsPanel() -> impl IntoView {
    let state = app_state();
    let items = move || state.read(|ws| ws.notifications().items().to_vec());

    let run = move |f: fn(&mut crate::notifications::NotificationLog) -> crate::error::NoteResult<()>| {
        if let Some(Err(e)) = state.update(|ws| f(ws.notifications_mut())) {
            state.report(e);
        }
    };

    view! {
        <Show when=move || state.notifications_open.get() fallback=|| ().into_view()>
            <aside class="fixed right-4 top-16 z-20 w-80 space-y-2 rounded-xl border border-border bg-background p-4 shadow-lg">
                <div class="flex items-center justify-between">
                    <h2 class="text-sm font-semibold">"Notifications"</h2>
                    <Toolbar>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=move |_| run(|log| log.mark_all_read())
                        >
                            "Mark all read"
                        </Button>
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Sm
                            on:click=move |_| run(|log| log.clear_all())
                        >
                            "Clear"
                        </Button>
                    </Toolbar>
                </div>
                {move || {
                    let items = items();
                    if items.is_empty() {
                        return view! {
                            <div class="text-xs text-muted-foreground">"Nothing new."</div>
                        }
                        .into_any();
                    }
                    let now = now_ms();
                    items
                        .into_iter()
                        .map(|n| {
                            let id = n.id.clone();
                            let class = if n.read {
                                "rounded-md p-2 text-xs"
                            } else {
                                "rounded-md bg-accent p-2 text-xs"
                            };
                            view! {
                                <div class=class>
                                    <div class="flex items-center justify-between">
                                        <span class="font-medium">{n.title.clone()}</span>
                                        <Button
                                            variant=ButtonVariant::Ghost
                                            size=ButtonSize::Icon
                                            attr:title="Remove"
                                            on:click=move |_| {
                                                if let Some(Err(e)) =
                                                    state.update(|ws| ws.notifications_mut().remove(&id))
                                                {
                                                    state.report(e);
                                                }
                                            }
                                        >
                                            <X class="size-3" />
                                        </Button>
                                    </div>
                                    <div class="text-muted-foreground">{n.message.clone()}</div>
                                    <div class="text-muted-foreground">
                                        {format_relative(n.timestamp, now)}
                                    </div>
                                </div>
                            }
                        })
                        .collect_view()
                        .into_any()
                }}
            </aside>
        </Show>
    }
}
