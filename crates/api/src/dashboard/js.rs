//! Dashboard JavaScript
//!
//! Polls `/status` and `/signal` every `CONFIG.pollInterval` ms with no
//! backoff; control buttons issue one-shot requests and alert on `ok: false`.

pub const SCRIPT: &str = r#"
// ============================================================================
// State
// ============================================================================
let authorized = false;

const el = (id) => document.getElementById(id);

function escapeHtml(text) {
    const div = document.createElement('div');
    div.textContent = text == null ? '' : String(text);
    return div.innerHTML;
}

function formatTime(iso) {
    if (!iso) return '--';
    return new Date(iso).toLocaleTimeString();
}

// ============================================================================
// Control actions
// ============================================================================
async function control(method, endpoint, body) {
    const options = { method, headers: {} };
    if (body !== undefined) {
        options.headers['Content-Type'] = 'application/json';
        options.body = JSON.stringify(body);
    }
    try {
        const res = await fetch(endpoint, options);
        const data = await res.json();
        if (data && data.ok === false) {
            alert(data.message || data.error);
            return null;
        }
        return data;
    } catch (e) {
        alert('Request failed: ' + e);
        return null;
    }
}

async function connectBroker() {
    const token = el('tokenInput').value.trim();
    if (!token) {
        alert('Enter an API token first');
        return;
    }
    if (await control('POST', '/connect', { token })) {
        el('tokenInput').value = '';
        pollStatus();
    }
}

async function disconnectBroker() {
    await control('POST', '/disconnect');
    pollStatus();
}

async function createBot(event) {
    event.preventDefault();
    const bot = {
        name: el('botName').value.trim(),
        symbol: el('botSymbol').value.trim(),
        timeframe: el('botTimeframe').value.trim(),
        stop_loss: parseFloat(el('botStopLoss').value),
        take_profit: parseFloat(el('botTakeProfit').value)
    };
    if (await control('POST', '/bots', bot)) {
        event.target.reset();
        el('botTimeframe').value = CONFIG.defaultTimeframe;
        pollStatus();
    }
}

async function botAction(id, action) {
    if (action === 'delete') {
        await control('DELETE', '/bots/' + id);
    } else {
        await control('POST', '/bots/' + id + '/' + action);
    }
    pollStatus();
}

// ============================================================================
// Rendering
// ============================================================================
function renderStatus(s) {
    authorized = s.is_authorized;

    const badge = el('phaseBadge');
    badge.className = 'status-badge status-' + s.phase;
    badge.textContent = s.phase;
    el('brokerName').textContent = s.broker;

    const showAccount = s.phase === 'connecting' || s.phase === 'connected';
    el('tokenForm').classList.toggle('hidden', showAccount);
    el('accountPanel').classList.toggle('hidden', !showAccount);

    if (s.is_authorized) {
        el('balance').textContent = Number(s.balance).toFixed(2) + ' ' + s.currency;
        el('accountType').textContent = s.account_type;
        el('loginId').textContent = s.login_id;
    } else {
        el('balance').textContent = s.phase === 'connecting' ? 'Connecting...' : '--';
        el('accountType').textContent = '--';
        el('loginId').textContent = '--';
    }

    const lastError = el('lastError');
    lastError.textContent = s.last_error || '';
    lastError.classList.toggle('hidden', !s.last_error);

    renderBots(s.active_bots || []);
    renderLogs(s.logs || []);
}

function renderBots(bots) {
    const body = el('botsBody');
    if (bots.length === 0) {
        body.innerHTML = '<tr><td colspan="7" class="empty">No bots yet</td></tr>';
        return;
    }
    body.innerHTML = bots.map(b => {
        const state = b.is_active
            ? '<span class="bot-on">ON</span>'
            : '<span class="bot-off">OFF</span>';
        const next = b.is_active ? 'stop' : 'start';
        return `<tr>
            <td>${escapeHtml(b.name)}</td>
            <td>${escapeHtml(b.symbol)}</td>
            <td>${escapeHtml(b.timeframe)}</td>
            <td>${b.stop_loss}</td>
            <td>${b.take_profit}</td>
            <td>${state}</td>
            <td>
                <button class="btn btn-secondary btn-small" onclick="botAction('${b.id}', '${next}')">${next}</button>
                <button class="btn btn-secondary btn-small" onclick="botAction('${b.id}', 'toggle')">toggle</button>
                <button class="btn btn-danger btn-small" onclick="botAction('${b.id}', 'delete')">delete</button>
            </td>
        </tr>`;
    }).join('');
}

function renderLogs(logs) {
    const log = el('activityLog');
    log.textContent = logs.slice().reverse().join('\n');
}

function clearSignal(note) {
    const dir = el('signalDirection');
    dir.className = 'signal-direction neutral';
    dir.textContent = '--';
    el('signalConfidence').textContent = '--';
    el('signalTrend').textContent = '--';
    el('signalWindow').textContent = '--';
    el('signalStrategyUsed').textContent = '';
    el('signalIndicators').textContent = '';
    el('signalNote').textContent = note;
}

function renderSignal(p) {
    const dir = el('signalDirection');
    dir.className = 'signal-direction ' + p.direction.toLowerCase();
    dir.textContent = p.direction;
    el('signalConfidence').textContent = p.confidence + '%';
    el('signalTrend').textContent = p.trend;
    el('signalWindow').textContent = formatTime(p.entry_time) + ' / ' + formatTime(p.exit_time);
    el('signalStrategyUsed').textContent = p.strategy_used;
    el('signalIndicators').textContent = p.indicator_status;
    el('signalNote').textContent = p.justification;
}

// ============================================================================
// Polling
// ============================================================================
function setBanner(visible) {
    el('errorBanner').classList.toggle('hidden', !visible);
}

async function pollStatus() {
    try {
        const res = await fetch('/status');
        if (!res.ok) throw new Error('HTTP ' + res.status);
        renderStatus(await res.json());
        setBanner(false);
        el('refreshTime').textContent = 'Updated ' + new Date().toLocaleTimeString();
    } catch (e) {
        console.error('Status poll failed:', e);
        setBanner(true);
    }
}

async function pollSignal() {
    if (!authorized) {
        clearSignal('Connect first');
        return;
    }
    const params = new URLSearchParams({
        symbol: el('signalSymbol').value.trim() || CONFIG.defaultSymbol,
        timeframe: el('signalTimeframe').value,
        strategy: el('signalStrategy').value || CONFIG.defaultStrategy
    });
    try {
        const res = await fetch('/signal?' + params);
        if (res.status === 401) {
            clearSignal('Connect first');
        } else if (res.status === 404) {
            clearSignal('Waiting for more data...');
        } else if (!res.ok) {
            const err = await res.json();
            clearSignal(err.message || ('HTTP ' + res.status));
        } else {
            renderSignal(await res.json());
        }
    } catch (e) {
        console.error('Signal poll failed:', e);
        setBanner(true);
    }
}

async function loadStrategies() {
    const select = el('signalStrategy');
    try {
        const res = await fetch('/strategies');
        const list = await res.json();
        select.innerHTML = list.map(s =>
            `<option value="${escapeHtml(s.id)}" title="${escapeHtml(s.description)}">${escapeHtml(s.name)}</option>`
        ).join('');
    } catch (e) {
        console.error('Could not load strategies:', e);
    }
    select.value = CONFIG.defaultStrategy;
}

async function tick() {
    await pollStatus();
    await pollSignal();
}

// ============================================================================
// Init
// ============================================================================
document.addEventListener('DOMContentLoaded', async () => {
    el('signalSymbol').value = CONFIG.defaultSymbol;
    el('signalTimeframe').value = CONFIG.defaultTimeframe;
    el('botTimeframe').value = CONFIG.defaultTimeframe;
    await loadStrategies();
    tick();
    setInterval(tick, CONFIG.pollInterval);
});
"#;
