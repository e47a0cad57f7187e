use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {NoteCard, div, "group relative flex flex-col gap-2 rounded-xl border border-border p-4 shadow-sm transition-shadow hover:shadow-md"}
    clx! {NoteCardTitle, h3, "truncate text-sm font-semibold"}
    clx! {NoteCardBody, div, "line-clamp-6 whitespace-pre-wrap text-sm text-muted-foreground"}
    clx! {NoteCardFooter, div, "mt-auto flex items-center justify-between text-xs text-muted-foreground"}
    clx! {Toolbar, div, "flex flex-wrap items-center gap-1"}
    clx! {Badge, span, "inline-flex min-w-5 items-center justify-center rounded-full bg-destructive px-1.5 text-[11px] font-medium text-white"}
}

pub use components::*;
