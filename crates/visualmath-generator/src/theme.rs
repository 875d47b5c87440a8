//! Built-in templates.
//!
//! Pages render their body with a page template and wrap it in `base.html`.
//! The AMP lesson is a standalone document. Partials ending in `_item.html`
//! render one list entry each.

/// Every built-in template, by name.
pub const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", BASE),
    ("index.html", INDEX),
    ("grade_item.html", GRADE_ITEM),
    ("grade_list.html", GRADE_LIST),
    ("lesson_item.html", LESSON_ITEM),
    ("lesson.html", LESSON),
    ("task_item.html", TASK_ITEM),
    ("amp_lesson.html", AMP_LESSON),
    ("amp_task_item.html", AMP_TASK_ITEM),
    ("task.html", TASK),
    ("privacy.html", PRIVACY),
    ("terms.html", TERMS),
];

/// Shared page layout.
pub const BASE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }} | {{ site_name }}</title>
    <meta name="description" content="{{ description }}">
    {{ safe head_extra? }}
    <style>
        :root {
            --color-primary: #2563EB;
            --color-bg: #F8FAFC;
            --color-surface: #FFFFFF;
            --color-text: #1E293B;
            --color-muted: #64748B;
            --color-border: #E2E8F0;
        }
        * { box-sizing: border-box; }
        body {
            margin: 0;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
            background: var(--color-bg);
            color: var(--color-text);
            line-height: 1.6;
        }
        a { color: var(--color-primary); text-decoration: none; }
        a:hover { text-decoration: underline; }
        .container { max-width: 960px; margin: 0 auto; padding: 1rem 1.5rem; }
        header { background: var(--color-surface); border-bottom: 1px solid var(--color-border); }
        .site-title { font-weight: 700; font-size: 1.25rem; color: var(--color-text); }
        .card-list { list-style: none; padding: 0; display: grid; gap: 1rem; }
        .card {
            background: var(--color-surface);
            border: 1px solid var(--color-border);
            border-radius: 0.75rem;
            padding: 1rem 1.25rem;
        }
        .card p { margin: 0.25rem 0 0; color: var(--color-muted); }
        .presentation { position: relative; width: 100%; padding-top: 56.25%; }
        .presentation iframe { position: absolute; inset: 0; width: 100%; height: 100%; border: 0; }
        .task-frame { width: 100%; min-height: 420px; border: 1px solid var(--color-border); border-radius: 0.5rem; background: #fff; }
        footer { color: var(--color-muted); font-size: 0.875rem; }
        footer a { margin-right: 1rem; }
    </style>
</head>
<body>
    <header>
        <nav class="container">
            <a href="{{ path "/" }}" class="site-title">{{ site_name }}</a>
        </nav>
    </header>
    <main class="container">
{{ safe content }}
    </main>
    <footer class="container">
        <a href="{{ path "/privacy" }}">Privacy Policy</a>
        <a href="{{ path "/terms" }}">Terms of Use</a>
    </footer>
</body>
</html>
"##;

/// Home page body: the grade list.
pub const INDEX: &str = r##"        <section class="grades">
            <h1>{{ site_name }}</h1>
            <p>Choose your grade.</p>
            <ul class="card-list">
{{ safe grades }}
            </ul>
        </section>"##;

pub const GRADE_ITEM: &str = r##"                <li class="card"><a href="{{ path url }}">Grade {{ grade }}</a></li>
"##;

/// Grade page body: the grade's lessons in order.
pub const GRADE_LIST: &str = r##"        <section class="lessons">
            <h1>Grade {{ grade }}</h1>
            <ul class="card-list">
{{ safe lessons }}
            </ul>
        </section>"##;

pub const LESSON_ITEM: &str = r##"                <li class="card">
                    <a href="{{ path url }}">{{ title }}</a>
                    <p>{{ description }}</p>
                </li>
"##;

/// Lesson page body. The grade link must be the first grade link on the page.
pub const LESSON: &str = r##"        <article class="lesson">
            <a class="back" href="{{ path grade_url }}">&larr; Grade {{ grade }}</a>
            <h1>{{ title }}</h1>
            <p class="description">{{ description }}</p>
            <div class="presentation">
                <iframe src="{{ embed_url }}" loading="lazy" allowfullscreen allow="fullscreen"></iframe>
            </div>
            <section class="tasks">
{{ safe tasks }}
            </section>
        </article>"##;

pub const TASK_ITEM: &str = r##"                <div class="card task">
                    <h2><a href="{{ path url }}">{{ title }}</a></h2>
                    <p>{{ description }}</p>
                    <iframe class="task-frame" srcdoc="{{ code }}" sandbox="allow-scripts allow-same-origin" loading="lazy"></iframe>
                </div>
"##;

/// Standalone AMP lesson document.
pub const AMP_LESSON: &str = r##"<!doctype html>
<html ⚡ lang="{{ lang }}">
<head>
    <meta charset="utf-8">
    <title>{{ title }} | {{ site_name }}</title>
    <link rel="canonical" href="{{ canonical_url }}">
    <meta name="viewport" content="width=device-width">
    <meta name="description" content="{{ description }}">
    <script async src="https://cdn.ampproject.org/v0.js"></script>
    <script async custom-element="amp-iframe" src="https://cdn.ampproject.org/v0/amp-iframe-0.1.js"></script>
    <style amp-boilerplate>body{-webkit-animation:-amp-start 8s steps(1,end) 0s 1 normal both;-moz-animation:-amp-start 8s steps(1,end) 0s 1 normal both;animation:-amp-start 8s steps(1,end) 0s 1 normal both}@-webkit-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@-moz-keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}@keyframes -amp-start{from{visibility:hidden}to{visibility:visible}}</style><noscript><style amp-boilerplate>body{-webkit-animation:none;-moz-animation:none;animation:none}</style></noscript>
    <style amp-custom>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; color: #1E293B; margin: 0; }
        article { max-width: 960px; margin: 0 auto; padding: 1rem 1.5rem; }
        a { color: #2563EB; }
    </style>
</head>
<body>
    <article>
        <a href="{{ path lesson_url }}">{{ site_name }}</a>
        <h1>{{ title }}</h1>
        <p>{{ description }}</p>
        <amp-iframe src="{{ embed_url }}" width="16" height="9" layout="responsive" sandbox="allow-scripts allow-same-origin allow-popups" allowfullscreen frameborder="0">
            <div placeholder></div>
        </amp-iframe>
        <ul>
{{ safe tasks }}
        </ul>
    </article>
</body>
</html>
"##;

pub const AMP_TASK_ITEM: &str = r##"            <li><a href="{{ path url }}">{{ title }}</a></li>
"##;

/// Task page body.
pub const TASK: &str = r##"        <article class="task-page">
            <a class="back" href="{{ path lesson_url }}">&larr; Lesson</a>
            <h1>{{ title }}</h1>
            <p class="description">{{ description }}</p>
            <iframe class="task-frame" srcdoc="{{ code }}" sandbox="allow-scripts allow-same-origin"></iframe>
        </article>"##;

pub const PRIVACY: &str = r##"        <article class="static-page">
            <h1>Privacy Policy</h1>
            <p>{{ site_name }} is a collection of static lesson pages. It does not ask for accounts, does not set its own cookies and does not collect personal data.</p>
            <p>Presentations and interactive tasks are embedded from third-party services, which may apply their own privacy policies when their content loads.</p>
        </article>"##;

pub const TERMS: &str = r##"        <article class="static-page">
            <h1>Terms of Use</h1>
            <p>The materials on {{ site_name }} are provided for learning purposes, free of charge and as is.</p>
            <p>Embedded presentations and tasks remain the property of their respective authors.</p>
        </article>"##;
