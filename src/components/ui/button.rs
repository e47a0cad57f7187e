use leptos::prelude::*;
use leptos_ui::variants;

variants! {
    Button {
        base: "inline-flex items-center justify-center gap-1.5 whitespace-nowrap rounded-md text-sm font-medium transition-colors disabled:pointer-events-none disabled:opacity-40 [&_svg]:pointer-events-none [&_svg:not([class*='size-'])]:size-4 shrink-0 outline-none focus-visible:ring-2 focus-visible:ring-ring/50 hover:cursor-pointer select-none",
        variants: {
            variant: {
                Default: "bg-primary text-primary-foreground hover:bg-primary/90",
                Ghost: "hover:bg-accent hover:text-accent-foreground",
                Outline: "border border-border bg-transparent hover:bg-accent",
                Destructive: "bg-destructive text-white hover:bg-destructive/90",
            },
            size: {
                Default: "h-9 px-4",
                Sm: "h-8 px-3 text-xs",
                Icon: "size-8",
            }
        },
        component: {
            element: button
        }
    }
}
