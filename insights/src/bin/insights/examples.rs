use crate::commands::{call, capabilities, catalog, dashboards, queries};

#[derive(Clone, Copy)]
pub struct ExampleGroup {
    pub title: &'static str,
    pub commands: &'static [&'static str],
}

#[derive(Clone, Copy)]
pub struct CommandExample {
    pub name: &'static str,
    pub groups: &'static [ExampleGroup],
}

pub fn command_examples() -> &'static [CommandExample] {
    &[
        CommandExample {
            name: "operators",
            groups: capabilities::OPERATOR_EXAMPLES,
        },
        CommandExample {
            name: "menu-options",
            groups: capabilities::MENU_EXAMPLES,
        },
        CommandExample {
            name: "data-sources",
            groups: catalog::DATA_SOURCE_EXAMPLES,
        },
        CommandExample {
            name: "tables",
            groups: catalog::TABLE_EXAMPLES,
        },
        CommandExample {
            name: "dashboards",
            groups: dashboards::LIST_EXAMPLES,
        },
        CommandExample {
            name: "create-dashboard",
            groups: dashboards::CREATE_EXAMPLES,
        },
        CommandExample {
            name: "queries",
            groups: queries::LIST_EXAMPLES,
        },
        CommandExample {
            name: "create-query",
            groups: queries::CREATE_EXAMPLES,
        },
        CommandExample {
            name: "call",
            groups: call::EXAMPLES,
        },
    ]
}
