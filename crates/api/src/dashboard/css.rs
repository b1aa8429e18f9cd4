//! Dashboard CSS styles

pub const STYLES: &str = r"
* { box-sizing: border-box; margin: 0; padding: 0; }

:root {
    --bg: #0d1117;
    --card: #161b22;
    --border: #30363d;
    --text: #c9d1d9;
    --text-dim: #8b949e;
    --green: #3fb950;
    --red: #f85149;
    --blue: #58a6ff;
    --yellow: #d29922;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: var(--bg);
    color: var(--text);
    padding: 20px;
    min-height: 100vh;
}

.container { max-width: 1100px; margin: 0 auto; }
.hidden { display: none !important; }
.dim { color: var(--text-dim); font-size: 13px; }
.mono { font-family: ui-monospace, monospace; font-size: 12px; margin: 8px 0; }
.error-text { color: var(--red); font-size: 13px; margin-top: 10px; }

.banner {
    position: sticky;
    top: 0;
    background: var(--red);
    color: #fff;
    text-align: center;
    padding: 8px;
    margin-bottom: 16px;
    border-radius: 6px;
}

header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    margin-bottom: 20px;
}

h1 { font-size: 24px; }
.refresh-time { color: var(--text-dim); font-size: 12px; }

.status-badge {
    padding: 4px 12px;
    border-radius: 12px;
    font-size: 12px;
    font-weight: 600;
    text-transform: uppercase;
}
.status-disconnected { background: var(--border); color: var(--text-dim); }
.status-connecting { background: var(--yellow); color: #000; }
.status-connected { background: var(--green); color: #000; }
.status-failed { background: var(--red); color: #fff; }

.grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
    gap: 16px;
    margin-bottom: 16px;
}

.card {
    background: var(--card);
    border: 1px solid var(--border);
    border-radius: 8px;
    padding: 16px;
    margin-bottom: 16px;
}
.card-header {
    display: flex;
    justify-content: space-between;
    margin-bottom: 12px;
}
.card-title { font-weight: 600; }
.card-value { font-size: 28px; font-weight: 700; margin-bottom: 12px; }

.metrics { display: flex; gap: 16px; margin: 12px 0; }
.metric-label { color: var(--text-dim); font-size: 11px; text-transform: uppercase; }
.metric-value { font-size: 14px; font-weight: 600; }

input, select {
    background: var(--bg);
    border: 1px solid var(--border);
    color: var(--text);
    border-radius: 6px;
    padding: 6px 8px;
}

.btn {
    border: none;
    border-radius: 6px;
    padding: 6px 12px;
    cursor: pointer;
    font-weight: 600;
}
.btn-primary { background: var(--blue); color: #000; }
.btn-secondary { background: var(--border); color: var(--text); }
.btn-danger { background: var(--red); color: #fff; }
.btn-small { padding: 3px 8px; font-size: 12px; }

.signal-controls { display: flex; gap: 8px; margin-bottom: 12px; }
.signal-direction { font-size: 32px; font-weight: 800; }
.signal-direction.call { color: var(--green); }
.signal-direction.put { color: var(--red); }
.signal-direction.neutral { color: var(--text-dim); }

.bot-form { display: flex; flex-wrap: wrap; gap: 8px; margin-bottom: 12px; }
.bot-form input { width: 120px; }

table { width: 100%; border-collapse: collapse; font-size: 13px; }
th, td { text-align: left; padding: 6px; border-bottom: 1px solid var(--border); }
th { color: var(--text-dim); font-weight: 500; }
td.empty { color: var(--text-dim); text-align: center; }
.bot-on { color: var(--green); font-weight: 600; }
.bot-off { color: var(--text-dim); }

.log {
    font-family: ui-monospace, monospace;
    font-size: 12px;
    max-height: 260px;
    overflow-y: auto;
    white-space: pre-wrap;
}
";
