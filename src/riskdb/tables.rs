// src/riskdb/tables.rs
// Curated reference data: known app conflicts, the app registry used for
// base risk, orphan-code signatures, and community-reported issues. Sourced
// from Shopify community forums and merchant reports; read-only at runtime.

use super::{AppRegistryEntry, CommunityIssueEntry, ConflictEntry, OrphanSignature, Severity};

pub(super) const KNOWN_CONFLICTS: &[ConflictEntry] = &[
    // Page builders never coexist cleanly
    ConflictEntry {
        apps: ("pagefly", "gempages"),
        severity: Severity::High,
        description: "Multiple page builders conflict. Both inject heavy scripts and modify theme code.",
        resolution: "Choose one page builder and uninstall the other.",
        report_count: 847,
    },
    ConflictEntry {
        apps: ("pagefly", "shogun"),
        severity: Severity::High,
        description: "PageFly and Shogun both modify theme templates and can overwrite each other.",
        resolution: "Use only one page builder.",
        report_count: 632,
    },
    ConflictEntry {
        apps: ("gempages", "shogun"),
        severity: Severity::High,
        description: "GemPages and Shogun conflict when building the same page types.",
        resolution: "Pick one page builder for your store.",
        report_count: 498,
    },
    // Review apps fight over product pages
    ConflictEntry {
        apps: ("loox", "judge.me"),
        severity: Severity::Medium,
        description: "Multiple review apps can show duplicate reviews or conflict on product pages.",
        resolution: "Use one review app.",
        report_count: 523,
    },
    ConflictEntry {
        apps: ("loox", "yotpo"),
        severity: Severity::Medium,
        description: "Both inject review widgets that can overlap or cause layout issues.",
        resolution: "Choose one review solution.",
        report_count: 412,
    },
    ConflictEntry {
        apps: ("judge.me", "yotpo"),
        severity: Severity::Medium,
        description: "Duplicate review functionality causes confusion and slower load times.",
        resolution: "Stick with one review app.",
        report_count: 387,
    },
    // Popups compete for the viewport
    ConflictEntry {
        apps: ("privy", "justuno"),
        severity: Severity::High,
        description: "Multiple popup apps fight for screen space and can show simultaneously.",
        resolution: "Use one popup/email capture app.",
        report_count: 678,
    },
    ConflictEntry {
        apps: ("privy", "klaviyo"),
        severity: Severity::Medium,
        description: "Both can show email signup popups. Klaviyo forms may conflict with Privy.",
        resolution: "Use Klaviyo's built-in forms or Privy for popups, not both.",
        report_count: 445,
    },
    // Checkout-adjacent apps
    ConflictEntry {
        apps: ("recharge", "bold subscriptions"),
        severity: Severity::High,
        description: "Multiple subscription apps will break checkout completely.",
        resolution: "Never run two subscription apps. Pick one.",
        report_count: 567,
    },
    ConflictEntry {
        apps: ("reconvert", "zipify"),
        severity: Severity::High,
        description: "Both modify thank-you/post-purchase pages and can conflict.",
        resolution: "Use one post-purchase upsell app.",
        report_count: 389,
    },
    ConflictEntry {
        apps: ("currency converter", "geolocation"),
        severity: Severity::High,
        description: "Multiple currency/location apps can show conflicting prices or cause checkout errors.",
        resolution: "Use Shopify's native currency features or one third-party solution.",
        report_count: 534,
    },
    // Translation apps intercept all page content
    ConflictEntry {
        apps: ("weglot", "langify"),
        severity: Severity::High,
        description: "Multiple translation apps will show conflicting translations.",
        resolution: "Use only one translation solution.",
        report_count: 298,
    },
    // Chat widgets
    ConflictEntry {
        apps: ("tidio", "gorgias"),
        severity: Severity::Low,
        description: "Multiple chat widgets can appear together and confuse customers.",
        resolution: "Use one customer support solution.",
        report_count: 187,
    },
];

pub(super) const APP_REGISTRY: &[AppRegistryEntry] = &[
    // Page builders make deep theme changes
    AppRegistryEntry { needle: "pagefly", display_name: "PageFly", base_risk: 40.0, category: "page_builder", rationale: "Makes deep changes to the theme; breakage affects the whole storefront." },
    AppRegistryEntry { needle: "gempages", display_name: "GemPages", base_risk: 35.0, category: "page_builder", rationale: "Makes deep changes to the theme; breakage affects the whole storefront." },
    AppRegistryEntry { needle: "shogun", display_name: "Shogun", base_risk: 35.0, category: "page_builder", rationale: "Makes deep changes to the theme; breakage affects the whole storefront." },
    // Reviews
    AppRegistryEntry { needle: "loox", display_name: "Loox", base_risk: 20.0, category: "reviews", rationale: "Adds widget code to product pages; usually safe." },
    AppRegistryEntry { needle: "judge.me", display_name: "Judge.me", base_risk: 15.0, category: "reviews", rationale: "Adds widget code to product pages; usually safe." },
    AppRegistryEntry { needle: "judgeme", display_name: "Judge.me", base_risk: 15.0, category: "reviews", rationale: "Adds widget code to product pages; usually safe." },
    AppRegistryEntry { needle: "yotpo", display_name: "Yotpo", base_risk: 20.0, category: "reviews", rationale: "Adds widget code to product pages; usually safe." },
    AppRegistryEntry { needle: "stamped", display_name: "Stamped.io", base_risk: 15.0, category: "reviews", rationale: "Adds widget code to product pages; usually safe." },
    // Marketing / popups
    AppRegistryEntry { needle: "klaviyo", display_name: "Klaviyo", base_risk: 15.0, category: "marketing", rationale: "Can add multiple scripts; stacking marketing apps slows stores." },
    AppRegistryEntry { needle: "omnisend", display_name: "Omnisend", base_risk: 15.0, category: "marketing", rationale: "Can add multiple scripts; stacking marketing apps slows stores." },
    AppRegistryEntry { needle: "privy", display_name: "Privy", base_risk: 25.0, category: "popup", rationale: "Adds popups that conflict with other popup apps." },
    AppRegistryEntry { needle: "justuno", display_name: "JustUno", base_risk: 25.0, category: "popup", rationale: "Adds popups that conflict with other popup apps." },
    // Subscriptions / checkout
    AppRegistryEntry { needle: "recharge", display_name: "ReCharge", base_risk: 30.0, category: "subscription", rationale: "Deeply integrated with checkout and payments." },
    AppRegistryEntry { needle: "bold subscriptions", display_name: "Bold Subscriptions", base_risk: 30.0, category: "subscription", rationale: "Deeply integrated with checkout and payments." },
    AppRegistryEntry { needle: "bold", display_name: "Bold", base_risk: 20.0, category: "checkout", rationale: "Checkout modifications directly affect sales when they break." },
    AppRegistryEntry { needle: "currency converter", display_name: "Currency Converter", base_risk: 35.0, category: "checkout", rationale: "Changes prices everywhere; can cause checkout confusion." },
    // Upsell
    AppRegistryEntry { needle: "zipify", display_name: "Zipify", base_risk: 25.0, category: "upsell", rationale: "Adds page elements; stacking upsell apps clutters the store." },
    AppRegistryEntry { needle: "reconvert", display_name: "ReConvert", base_risk: 25.0, category: "upsell", rationale: "Adds page elements; stacking upsell apps clutters the store." },
    // Support / chat
    AppRegistryEntry { needle: "tidio", display_name: "Tidio", base_risk: 20.0, category: "chat", rationale: "Adds a chat bubble; rarely causes problems." },
    AppRegistryEntry { needle: "gorgias", display_name: "Gorgias", base_risk: 15.0, category: "chat", rationale: "Adds a chat bubble; rarely causes problems." },
    // Translation
    AppRegistryEntry { needle: "weglot", display_name: "Weglot", base_risk: 25.0, category: "translation", rationale: "Rewrites text across the entire store; can slow pages." },
    AppRegistryEntry { needle: "langify", display_name: "Langify", base_risk: 25.0, category: "translation", rationale: "Rewrites text across the entire store; can slow pages." },
    // Shipping / misc
    AppRegistryEntry { needle: "aftership", display_name: "AfterShip", base_risk: 10.0, category: "shipping", rationale: "Minimal impact; usually just tracking info." },
    AppRegistryEntry { needle: "vitals", display_name: "Vitals", base_risk: 30.0, category: "all_in_one", rationale: "All-in-one app; more features means more conflict surface." },
    AppRegistryEntry { needle: "instafeed", display_name: "Instafeed", base_risk: 20.0, category: "social_proof", rationale: "Social proof widgets can stack and slow the store." },
    AppRegistryEntry { needle: "smile", display_name: "Smile.io", base_risk: 20.0, category: "social_proof", rationale: "Adds loyalty widgets across the storefront." },
];

pub(super) const ORPHAN_SIGNATURES: &[OrphanSignature] = &[
    OrphanSignature {
        app: "PageFly",
        patterns: &["pagefly", r"pf-[a-z0-9]+", r"__pf_[a-z]+", "data-pf-type", r"pagefly\.io"],
        cleanup_guide: "Remove all snippets starting with 'pf-' and references in theme.liquid.",
    },
    OrphanSignature {
        app: "GemPages",
        patterns: &["gempages", r"gp-[a-z0-9]+", "__gem", "gem-page", r"gempages\.net"],
        cleanup_guide: "Remove GemPages snippets and template references.",
    },
    OrphanSignature {
        app: "Shogun",
        patterns: &["shogun", r"shg-[a-z]+", r"getshogun\.com"],
        cleanup_guide: "Remove Shogun sections and snippet includes.",
    },
    OrphanSignature {
        app: "Loox",
        patterns: &["loox", r"loox\.io"],
        cleanup_guide: "Remove Loox widget code and snippet references.",
    },
    OrphanSignature {
        app: "Judge.me",
        patterns: &["judgeme", r"judge\.me", r"jdgm-[a-z]+", "jdgm_"],
        cleanup_guide: "Remove Judge.me badges and widget snippets.",
    },
    OrphanSignature {
        app: "Privy",
        patterns: &["privy", r"widget\.privy\.com"],
        cleanup_guide: "Remove the Privy script tag from theme.liquid.",
    },
    OrphanSignature {
        app: "Klaviyo",
        patterns: &["klaviyo", "_learnq", r"static\.klaviyo\.com"],
        cleanup_guide: "Remove the Klaviyo tracking script and form snippets.",
    },
    OrphanSignature {
        app: "Yotpo",
        patterns: &["yotpo", r"staticw2\.yotpo\.com"],
        cleanup_guide: "Remove Yotpo widgets and review snippets.",
    },
    OrphanSignature {
        app: "ReCharge",
        patterns: &["recharge", "rechargepayments", r"rechargeapps\.com"],
        cleanup_guide: "Remove the ReCharge subscription widget code.",
    },
    OrphanSignature {
        app: "Tidio",
        patterns: &["tidio", r"code\.tidio\.co"],
        cleanup_guide: "Remove the Tidio chat widget script.",
    },
    OrphanSignature {
        app: "Omnisend",
        patterns: &["omnisend", "omnisrc", "omnisnippet"],
        cleanup_guide: "Remove Omnisend tracking and form code.",
    },
];

pub(super) const COMMUNITY_ISSUES: &[CommunityIssueEntry] = &[
    CommunityIssueEntry {
        app: "pagefly",
        common_issues: &[
            "Adds 2-5 seconds of page load",
            "Breaks mobile menus on some themes",
            "Leaves orphan code after uninstall",
        ],
        report_count: 1247,
    },
    CommunityIssueEntry {
        app: "gempages",
        common_issues: &[
            "Heavy JavaScript bundle slows the store",
            "CSS conflicts with custom themes",
            "Duplicate jQuery loading",
        ],
        report_count: 987,
    },
    CommunityIssueEntry {
        app: "vitals",
        common_issues: &[
            "All-in-one app with many potential conflicts",
            "Adds significant page weight",
        ],
        report_count: 756,
    },
    CommunityIssueEntry {
        app: "klaviyo",
        common_issues: &[
            "Popup forms conflict with theme modals",
            "Tracking script can slow initial load",
        ],
        report_count: 534,
    },
    CommunityIssueEntry {
        app: "recharge",
        common_issues: &[
            "Checkout modifications break with theme updates",
            "Conflicts with other cart modification apps",
        ],
        report_count: 445,
    },
    CommunityIssueEntry {
        app: "loox",
        common_issues: &[
            "Review carousel conflicts with theme sliders",
            "Photo reviews slow down product pages",
        ],
        report_count: 367,
    },
];

/// Functional groups used for duplicate-functionality detection.
pub(super) const FUNCTIONALITY_GROUPS: &[(&str, &[&str])] = &[
    ("page_builder", &["pagefly", "gempages", "shogun", "replo", "ecomposer"]),
    ("reviews", &["loox", "judge.me", "judgeme", "yotpo", "stamped", "okendo"]),
    ("popup_email", &["privy", "justuno", "optinmonster", "wheelio"]),
    ("upsell", &["reconvert", "zipify", "honeycomb", "aftersell"]),
    ("subscription", &["recharge", "bold subscriptions", "seal", "appstle"]),
    ("translation", &["weglot", "langify", "transcy"]),
    ("currency", &["currency converter", "bold currency", "auto currency"]),
    ("chat", &["tidio", "gorgias", "intercom", "drift", "zendesk"]),
];
