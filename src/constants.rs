pub const PALETTE: [&str; 6] = [
    "#E8EAF6", "#E0F2F1", "#F3E5F5", "#FFF9C4", "#FBE9E7", "#E1F5FE",
];

pub const STORAGE: StorageSettings = StorageSettings {
    slot_key: "dashboard-cards",
    qualifier: "com",
    organization: "shopboard",
    application: "shopboard",
    max_backups: 10,
};

pub const GRID: GridSettings = GridSettings {
    breakpoints: &[
        Breakpoint { name: "lg", min_width: 1200, cols: 5 },
        Breakpoint { name: "md", min_width: 996, cols: 4 },
        Breakpoint { name: "sm", min_width: 768, cols: 3 },
        Breakpoint { name: "xs", min_width: 480, cols: 2 },
        Breakpoint { name: "xxs", min_width: 0, cols: 1 },
    ],
    add_stride: 2,
    default_w: 1,
    default_h: 2,
    max_h: 100,
    max_row: 10_000,
};

pub const CARD_DEFAULTS: CardDefaults = CardDefaults {
    title: "New Card",
    blank_price: "0",
};

pub const TUI: TuiSettings = TuiSettings {
    cell_px: 8,
    row_cells: 4,
    gutter: 1,
    tick_ms: 250,
    color_step: 16,
    popover_width: 30,
    popover_height: 9,
};

pub const CLUB: ClubSettings = ClubSettings {
    api_url: "http://localhost:4000",
    timeout_secs: 10,
    purchase_threshold: 300.0,
    phone_prefix: "09",
    phone_len: 11,
    page_sizes: &[5, 10, 25],
    currency: "€",
};

pub struct Breakpoint {
    pub name: &'static str,
    pub min_width: u32,
    pub cols: u16,
}

pub struct StorageSettings {
    pub slot_key: &'static str,
    pub qualifier: &'static str,
    pub organization: &'static str,
    pub application: &'static str,
    pub max_backups: usize,
}

pub struct GridSettings {
    pub breakpoints: &'static [Breakpoint],
    pub add_stride: u32,
    pub default_w: u32,
    pub default_h: u32,
    pub max_h: u32,
    pub max_row: u32,
}

pub struct CardDefaults {
    pub title: &'static str,
    pub blank_price: &'static str,
}

pub struct TuiSettings {
    pub cell_px: u32,
    pub row_cells: u16,
    pub gutter: u16,
    pub tick_ms: u64,
    pub color_step: u8,
    pub popover_width: u16,
    pub popover_height: u16,
}

pub struct ClubSettings {
    pub api_url: &'static str,
    pub timeout_secs: u64,
    pub purchase_threshold: f64,
    pub phone_prefix: &'static str,
    pub phone_len: usize,
    pub page_sizes: &'static [usize],
    pub currency: &'static str,
}
